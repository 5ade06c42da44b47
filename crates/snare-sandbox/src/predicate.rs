use serde_json::Value;
use snare_compiler::compile::CompiledPredicate;
use snare_ir::expr::{Expr, OpKind};
use snare_ir::types::TrapState;

#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("Field not found: {path}")]
    FieldNotFound { path: String },

    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },
}

/// An isolated predicate instance. Holds no mutable state, so a failed
/// run cannot poison a later one.
pub struct Predicate {
    plan: CompiledPredicate,
}

impl Predicate {
    pub fn new(plan: CompiledPredicate) -> Self {
        Self { plan }
    }

    /// Evaluate against a state snapshot. The raw result is coerced to
    /// a boolean with [`truthy`].
    pub fn run(&self, state: &TrapState) -> Result<bool, PredicateError> {
        let value = eval_expr(&self.plan.expr, state)?;
        Ok(truthy(&value))
    }
}

/// Boolean coercion applied to predicate results: `null`, `false`,
/// `0`, NaN, and `""` are falsy; everything else (arrays and objects
/// included) is truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Evaluation ───────────────────────────────────────────────────────

pub fn eval_expr(expr: &Expr, state: &TrapState) -> Result<Value, PredicateError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Field { path } => lookup_field(path, state),
        Expr::Op { op, args } => eval_op(*op, args, state),
    }
}

/// Dotted paths descend into nested objects.
fn lookup_field(path: &str, state: &TrapState) -> Result<Value, PredicateError> {
    let missing = || PredicateError::FieldNotFound { path: path.to_string() };
    let mut parts = path.split('.');
    // split yields at least one segment
    let first = parts.next().unwrap_or("");
    let mut current = state.get(first).ok_or_else(missing)?;
    for part in parts {
        current = current.get(part).ok_or_else(missing)?;
    }
    Ok(current.clone())
}

fn eval_op(op: OpKind, args: &[Expr], state: &TrapState) -> Result<Value, PredicateError> {
    match op {
        OpKind::Eq => {
            let left = eval_expr(&args[0], state)?;
            let right = eval_expr(&args[1], state)?;
            Ok(Value::Bool(json_eq(&left, &right)))
        }
        OpKind::Neq => {
            let left = eval_expr(&args[0], state)?;
            let right = eval_expr(&args[1], state)?;
            Ok(Value::Bool(!json_eq(&left, &right)))
        }
        OpKind::And => {
            for arg in args {
                let val = eval_expr(arg, state)?;
                if !truthy(&val) {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        OpKind::Or => {
            for arg in args {
                let val = eval_expr(arg, state)?;
                if truthy(&val) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        OpKind::Not => {
            let val = eval_expr(&args[0], state)?;
            Ok(Value::Bool(!truthy(&val)))
        }
        OpKind::Lt => eval_compare(args, state, |a, b| a < b),
        OpKind::Lte => eval_compare(args, state, |a, b| a <= b),
        OpKind::Gt => eval_compare(args, state, |a, b| a > b),
        OpKind::Gte => eval_compare(args, state, |a, b| a >= b),
    }
}

/// Equality with numeric cross-type comparison: numbers compare by
/// value, everything else structurally.
fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => left == right,
    }
}

fn eval_compare(
    args: &[Expr],
    state: &TrapState,
    cmp: fn(f64, f64) -> bool,
) -> Result<Value, PredicateError> {
    let left = eval_expr(&args[0], state)?;
    let right = eval_expr(&args[1], state)?;
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Bool(cmp(x, y))),
            _ => Err(PredicateError::TypeError {
                expected: "finite number".to_string(),
                actual: format!("{left}, {right}"),
            }),
        },
        _ => Err(PredicateError::TypeError {
            expected: "number".to_string(),
            actual: format!("{left}, {right}"),
        }),
    }
}
