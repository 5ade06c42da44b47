use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use snare_sandbox::provider::{ProviderError, StateProvider};

/// Scripted in-memory provider. Serves canned per-method responses or
/// injected faults, optionally with fixed latency, and tracks call
/// volume and peak concurrency so scheduler tests can assert
/// single-flight execution. Also usable offline in place of a live
/// endpoint.
#[derive(Default)]
pub struct StaticProvider {
    responses: Mutex<HashMap<String, Result<Value, String>>>,
    latency: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, method: &str, value: Value) -> Self {
        self.set_response(method, value);
        self
    }

    pub fn with_fault(self, method: &str, message: &str) -> Self {
        self.set_fault(method, message);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Rescript a method on a live provider.
    pub fn set_response(&self, method: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Ok(value));
    }

    pub fn set_fault(&self, method: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Err(message.to_string()));
    }

    /// Total calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently executing calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateProvider for StaticProvider {
    async fn call(&self, method: &str, _params: &[Value]) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let result = match self.responses.lock().unwrap().get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ProviderError::Fault { message: message.clone() }),
            None => Err(ProviderError::UnknownMethod { method: method.to_string() }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
