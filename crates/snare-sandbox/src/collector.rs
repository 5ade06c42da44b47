use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use snare_compiler::compile::CompiledCollector;
use snare_ir::collect::CollectStep;
use snare_ir::types::TrapState;

use crate::provider::{ProviderError, StateProvider};

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Malformed quantity: {got}")]
    MalformedQuantity { got: String },

    #[error("Word {index} out of range for {words}-word result")]
    WordOutOfRange { index: usize, words: usize },

    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Expected an array to index, got {got}")]
    NotAnArray { got: String },

    #[error("Expected an ABI-encoded hex string, got {got}")]
    NotHex { got: String },

    #[error("Result is not a representable number: {value}")]
    NotRepresentable { value: f64 },
}

/// An isolated collector instance. External reads go only through the
/// injected provider; a failed run leaves nothing behind.
pub struct Collector {
    plan: CompiledCollector,
}

impl Collector {
    pub fn new(plan: CompiledCollector) -> Self {
        Self { plan }
    }

    /// Execute every step and assemble the state snapshot. Fails on
    /// the first failing field.
    pub async fn run(&self, provider: &dyn StateProvider) -> Result<TrapState, CollectionError> {
        let mut state = TrapState::new();
        for (name, step) in &self.plan.fields {
            let value = eval_step(step, provider).await?;
            state.insert(name.clone(), value);
        }
        Ok(state)
    }
}

/// Recursive step evaluation, boxed because steps nest through async
/// provider calls.
fn eval_step<'a>(
    step: &'a CollectStep,
    provider: &'a dyn StateProvider,
) -> Pin<Box<dyn Future<Output = Result<Value, CollectionError>> + Send + 'a>> {
    Box::pin(async move {
        match step {
            CollectStep::Call { method, params } => Ok(provider.call(method, params).await?),
            CollectStep::Scale { inner, decimals } => {
                let raw = eval_step(inner, provider).await?;
                let scaled = quantity(&raw)? / 10f64.powi(*decimals as i32);
                number(scaled)
            }
            CollectStep::Word { inner, index } => {
                let raw = eval_step(inner, provider).await?;
                extract_word(&raw, *index)
            }
            CollectStep::Index { inner, index } => {
                let raw = eval_step(inner, provider).await?;
                match raw {
                    Value::Array(items) => {
                        let len = items.len();
                        items
                            .into_iter()
                            .nth(*index)
                            .ok_or(CollectionError::IndexOutOfRange { index: *index, len })
                    }
                    other => Err(CollectionError::NotAnArray { got: other.to_string() }),
                }
            }
            CollectStep::Sum { parts } => {
                let mut total = 0.0;
                for part in parts {
                    let raw = eval_step(part, provider).await?;
                    total += quantity(&raw)?;
                }
                number(total)
            }
            CollectStep::Now => Ok(Value::from(chrono::Utc::now().timestamp_millis())),
            CollectStep::Const { value } => Ok(value.clone()),
        }
    })
}

/// Coerce a step result to f64: JSON numbers directly, `0x` hex
/// quantities (node responses), and decimal strings.
pub fn quantity(value: &Value) -> Result<f64, CollectionError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CollectionError::MalformedQuantity { got: n.to_string() }),
        Value::String(s) => {
            let trimmed = s.trim();
            let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
                Some(hex) => hex_to_f64(hex),
                None => trimmed.parse::<f64>().ok(),
            };
            parsed.ok_or_else(|| CollectionError::MalformedQuantity { got: s.clone() })
        }
        other => Err(CollectionError::MalformedQuantity { got: other.to_string() }),
    }
}

fn hex_to_f64(hex: &str) -> Option<f64> {
    if hex.is_empty() {
        return None;
    }
    if let Ok(v) = u128::from_str_radix(hex, 16) {
        return Some(v as f64);
    }
    // Quantities beyond u128 lose precision but still scale correctly.
    hex.chars()
        .try_fold(0f64, |acc, c| c.to_digit(16).map(|d| acc * 16.0 + d as f64))
}

fn number(value: f64) -> Result<Value, CollectionError> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or(CollectionError::NotRepresentable { value })
}

/// Slice the `index`-th 32-byte word out of an ABI-encoded hex string.
/// Multi-value eth_call results come back as one hex blob.
fn extract_word(value: &Value, index: usize) -> Result<Value, CollectionError> {
    let text = value
        .as_str()
        .ok_or_else(|| CollectionError::NotHex { got: value.to_string() })?;
    let hex = text.strip_prefix("0x").unwrap_or(text);
    if hex.len() % 64 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CollectionError::NotHex { got: text.to_string() });
    }
    let words = hex.len() / 64;
    if index >= words {
        return Err(CollectionError::WordOutOfRange { index, words });
    }
    let start = index * 64;
    Ok(Value::String(format!("0x{}", &hex[start..start + 64])))
}
