use serde::{Deserialize, Serialize};

/// Predicate expression over a collected state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(serde_json::Value),
    Field {
        path: String,
    },
    Op {
        op: OpKind,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Eq,
    Neq,
    And,
    Or,
    Not,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        parse_expr(&value).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn parse_expr(value: &serde_json::Value) -> Result<Expr, String> {
    match value {
        // Literals: bool, number, string (non-array)
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) | serde_json::Value::String(_) => {
            Ok(Expr::Literal(value.clone()))
        }

        // Array forms: ["op", ...args]
        serde_json::Value::Array(arr) => {
            if arr.is_empty() {
                return Err("empty expression array".to_string());
            }
            let tag = arr[0]
                .as_str()
                .ok_or_else(|| format!("first element of expression array must be a string, got: {:?}", arr[0]))?;

            match tag {
                // Field access: ["field", name]; dotted names descend into nested objects
                "field" => {
                    if arr.len() != 2 {
                        return Err(format!("field expression requires 2 elements, got {}", arr.len()));
                    }
                    let path = arr[1].as_str().ok_or("field name must be a string")?.to_string();
                    Ok(Expr::Field { path })
                }

                // Operators: ["eq"|"neq"|"and"|"or"|"not"|"lt"|"lte"|"gt"|"gte", ...args]
                _ => {
                    let op = match tag {
                        "eq" => OpKind::Eq,
                        "neq" => OpKind::Neq,
                        "and" => OpKind::And,
                        "or" => OpKind::Or,
                        "not" => OpKind::Not,
                        "lt" => OpKind::Lt,
                        "lte" => OpKind::Lte,
                        "gt" => OpKind::Gt,
                        "gte" => OpKind::Gte,
                        other => return Err(format!("unknown predicate operator: {other}")),
                    };
                    let args = arr[1..]
                        .iter()
                        .map(parse_expr)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Expr::Op { op, args })
                }
            }
        }

        other => Err(format!("unsupported expression value: {other}")),
    }
}
