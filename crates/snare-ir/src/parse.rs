use crate::collect::parse_step;
use crate::expr::parse_expr;
use crate::types::{CollectorDoc, PredicateDoc};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("source must be a JSON object, got {got}")]
    NotAnObject { got: &'static str },

    #[error("source does not define \"{expected}\"")]
    MissingEntry { expected: &'static str },

    #[error("{context}: {detail}")]
    Malformed { context: String, detail: String },
}

/// Parse a predicate source: `{"should_respond": <expr>}`.
pub fn parse_predicate(source: &str) -> Result<PredicateDoc, ParseError> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    let obj = value
        .as_object()
        .ok_or(ParseError::NotAnObject { got: json_kind(&value) })?;
    let expr_value = obj
        .get("should_respond")
        .ok_or(ParseError::MissingEntry { expected: "should_respond" })?;
    let should_respond = parse_expr(expr_value).map_err(|detail| ParseError::Malformed {
        context: "should_respond".to_string(),
        detail,
    })?;
    Ok(PredicateDoc { should_respond })
}

/// Parse a collector source: `{"collect": {"<field>": <step>, ...}}`.
pub fn parse_collector(source: &str) -> Result<CollectorDoc, ParseError> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    let obj = value
        .as_object()
        .ok_or(ParseError::NotAnObject { got: json_kind(&value) })?;
    let fields_value = obj
        .get("collect")
        .ok_or(ParseError::MissingEntry { expected: "collect" })?;
    let fields_obj = fields_value.as_object().ok_or_else(|| ParseError::Malformed {
        context: "collect".to_string(),
        detail: "must be an object mapping field names to steps".to_string(),
    })?;

    let mut fields = Vec::with_capacity(fields_obj.len());
    for (name, step_value) in fields_obj {
        let step = parse_step(step_value).map_err(|detail| ParseError::Malformed {
            context: format!("collect.{name}"),
            detail,
        })?;
        fields.push((name.clone(), step));
    }
    Ok(CollectorDoc { fields })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
