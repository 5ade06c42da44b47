use async_trait::async_trait;
use serde_json::{json, Value};
use snare_sandbox::provider::{ProviderError, StateProvider};
use tracing::debug;

use crate::config::ProviderConfig;

/// JSON-RPC 2.0 over HTTP POST. One endpoint, stateless requests.
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Transport { message: e.to_string() })?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl StateProvider for HttpProvider {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, ProviderError> {
        debug!(method, "rpc call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport { message: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport { message: format!("HTTP {status}") });
        }
        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse { reason: e.to_string() })?;

        if let Some(error) = envelope.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-1);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(ProviderError::Rpc { code, message });
        }
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ProviderError::MalformedResponse {
                reason: "response has neither result nor error".to_string(),
            })
    }
}
