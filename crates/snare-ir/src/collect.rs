use serde::{Deserialize, Serialize};

/// One step of a collector plan. Steps nest; only `Call` touches the
/// outside world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CollectStep {
    Call {
        method: String,
        params: Vec<serde_json::Value>,
    },
    Scale {
        inner: Box<CollectStep>,
        decimals: u32,
    },
    Word {
        inner: Box<CollectStep>,
        index: usize,
    },
    Index {
        inner: Box<CollectStep>,
        index: usize,
    },
    Sum {
        parts: Vec<CollectStep>,
    },
    Now,
    Const {
        value: serde_json::Value,
    },
}

impl<'de> Deserialize<'de> for CollectStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        parse_step(&value).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn parse_step(value: &serde_json::Value) -> Result<CollectStep, String> {
    let arr = match value {
        serde_json::Value::Array(arr) => arr,
        other => return Err(format!("collect step must be an array form, got: {other}")),
    };
    if arr.is_empty() {
        return Err("empty step array".to_string());
    }
    let tag = arr[0]
        .as_str()
        .ok_or_else(|| format!("first element of step array must be a string, got: {:?}", arr[0]))?;

    match tag {
        // Provider call: ["call", method] or ["call", method, [params]]
        "call" => {
            if arr.len() < 2 || arr.len() > 3 {
                return Err(format!("call step requires 2-3 elements, got {}", arr.len()));
            }
            let method = arr[1].as_str().ok_or("call method must be a string")?.to_string();
            let params = if arr.len() == 3 {
                arr[2]
                    .as_array()
                    .ok_or("call params must be an array")?
                    .clone()
            } else {
                Vec::new()
            };
            Ok(CollectStep::Call { method, params })
        }

        // Numeric down-scaling: ["scale", step, decimals]
        "scale" => {
            if arr.len() != 3 {
                return Err(format!("scale step requires 3 elements, got {}", arr.len()));
            }
            let inner = Box::new(parse_step(&arr[1])?);
            let decimals = arr[2]
                .as_u64()
                .and_then(|d| u32::try_from(d).ok())
                .ok_or("scale decimals must be a non-negative integer")?;
            Ok(CollectStep::Scale { inner, decimals })
        }

        // ABI word extraction: ["word", step, index]
        "word" => {
            if arr.len() != 3 {
                return Err(format!("word step requires 3 elements, got {}", arr.len()));
            }
            let inner = Box::new(parse_step(&arr[1])?);
            let index = arr[2]
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or("word index must be a non-negative integer")?;
            Ok(CollectStep::Word { inner, index })
        }

        // Array element: ["index", step, i]
        "index" => {
            if arr.len() != 3 {
                return Err(format!("index step requires 3 elements, got {}", arr.len()));
            }
            let inner = Box::new(parse_step(&arr[1])?);
            let index = arr[2]
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or("index must be a non-negative integer")?;
            Ok(CollectStep::Index { inner, index })
        }

        // Numeric sum: ["sum", ...steps]
        "sum" => {
            if arr.len() < 2 {
                return Err("sum step requires at least 1 part".to_string());
            }
            let parts = arr[1..]
                .iter()
                .map(parse_step)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CollectStep::Sum { parts })
        }

        // Current Unix time in milliseconds: ["now"]
        "now" => {
            if arr.len() != 1 {
                return Err(format!("now step takes no arguments, got {}", arr.len() - 1));
            }
            Ok(CollectStep::Now)
        }

        // Literal value: ["const", value]
        "const" => {
            if arr.len() != 2 {
                return Err(format!("const step requires 2 elements, got {}", arr.len()));
            }
            Ok(CollectStep::Const { value: arr[1].clone() })
        }

        other => Err(format!("unknown collect step: {other}")),
    }
}
