use snare_ir::collect::CollectStep;
use snare_ir::expr::{Expr, OpKind};
use snare_ir::types::{CollectorDoc, PredicateDoc};

use crate::limits::CompileLimits;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Source is {bytes} bytes, limit is {max}")]
    SourceTooLarge { bytes: usize, max: usize },

    #[error("Empty field name in collector")]
    EmptyFieldName,

    #[error("Empty method name in call step")]
    EmptyMethodName,

    #[error("Operator '{op}' requires exactly {expected} argument(s), got {got}")]
    OpArity {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Operator '{op}' requires at least 1 argument")]
    OpNoArgs { op: &'static str },

    #[error("Empty field path in predicate")]
    EmptyFieldPath,

    #[error("Nesting depth {depth} exceeds limit {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Collector has {count} steps, limit is {max}")]
    TooManySteps { count: usize, max: usize },

    #[error("Scale decimals {decimals} exceeds limit {max}")]
    ScaleTooLarge { decimals: u32, max: u32 },
}

/// Gate a raw source on the byte-length cap before parsing it.
pub fn check_source_size(source: &str, limits: &CompileLimits) -> Result<(), ValidationError> {
    if source.len() > limits.max_source_bytes {
        return Err(ValidationError::SourceTooLarge {
            bytes: source.len(),
            max: limits.max_source_bytes,
        });
    }
    Ok(())
}

pub fn validate_predicate(
    doc: &PredicateDoc,
    limits: &CompileLimits,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_expr(&doc.should_respond, 1, limits, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_collector(
    doc: &CollectorDoc,
    limits: &CompileLimits,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut step_count = 0usize;
    for (name, step) in &doc.fields {
        if name.is_empty() {
            errors.push(ValidationError::EmptyFieldName);
        }
        check_step(step, 1, limits, &mut step_count, &mut errors);
    }
    if step_count > limits.max_collector_steps {
        errors.push(ValidationError::TooManySteps {
            count: step_count,
            max: limits.max_collector_steps,
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check operator arities, field paths, and nesting depth.
fn check_expr(expr: &Expr, depth: usize, limits: &CompileLimits, errors: &mut Vec<ValidationError>) {
    if depth > limits.max_depth {
        // Report once and stop descending.
        errors.push(ValidationError::DepthExceeded {
            depth,
            max: limits.max_depth,
        });
        return;
    }
    match expr {
        Expr::Literal(_) => {}
        Expr::Field { path } => {
            if path.is_empty() {
                errors.push(ValidationError::EmptyFieldPath);
            }
        }
        Expr::Op { op, args } => {
            match op {
                OpKind::Not => {
                    if args.len() != 1 {
                        errors.push(ValidationError::OpArity {
                            op: "not",
                            expected: 1,
                            got: args.len(),
                        });
                    }
                }
                OpKind::And | OpKind::Or => {
                    if args.is_empty() {
                        errors.push(ValidationError::OpNoArgs { op: op_name(*op) });
                    }
                }
                OpKind::Eq | OpKind::Neq | OpKind::Lt | OpKind::Lte | OpKind::Gt | OpKind::Gte => {
                    if args.len() != 2 {
                        errors.push(ValidationError::OpArity {
                            op: op_name(*op),
                            expected: 2,
                            got: args.len(),
                        });
                    }
                }
            }
            for arg in args {
                check_expr(arg, depth + 1, limits, errors);
            }
        }
    }
}

/// Check step counts, call hygiene, scale bounds, and nesting depth.
fn check_step(
    step: &CollectStep,
    depth: usize,
    limits: &CompileLimits,
    step_count: &mut usize,
    errors: &mut Vec<ValidationError>,
) {
    *step_count += 1;
    if depth > limits.max_depth {
        errors.push(ValidationError::DepthExceeded {
            depth,
            max: limits.max_depth,
        });
        return;
    }
    match step {
        CollectStep::Call { method, .. } => {
            if method.is_empty() {
                errors.push(ValidationError::EmptyMethodName);
            }
        }
        CollectStep::Scale { inner, decimals } => {
            if *decimals > limits.max_scale_decimals {
                errors.push(ValidationError::ScaleTooLarge {
                    decimals: *decimals,
                    max: limits.max_scale_decimals,
                });
            }
            check_step(inner, depth + 1, limits, step_count, errors);
        }
        CollectStep::Word { inner, .. } | CollectStep::Index { inner, .. } => {
            check_step(inner, depth + 1, limits, step_count, errors);
        }
        CollectStep::Sum { parts } => {
            for part in parts {
                check_step(part, depth + 1, limits, step_count, errors);
            }
        }
        CollectStep::Now | CollectStep::Const { .. } => {}
    }
}

fn op_name(op: OpKind) -> &'static str {
    match op {
        OpKind::Eq => "eq",
        OpKind::Neq => "neq",
        OpKind::And => "and",
        OpKind::Or => "or",
        OpKind::Not => "not",
        OpKind::Lt => "lt",
        OpKind::Lte => "lte",
        OpKind::Gt => "gt",
        OpKind::Gte => "gte",
    }
}
