use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Unknown method '{method}'")]
    UnknownMethod { method: String },

    #[error("{message}")]
    Fault { message: String },
}

/// The capability handed to a collector. Every external read a
/// collector performs goes through this trait; nothing else in the
/// sandbox reaches the outside world.
#[async_trait]
pub trait StateProvider: Send + Sync {
    async fn call(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, ProviderError>;
}
