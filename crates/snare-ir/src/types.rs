use serde::{Deserialize, Serialize};

use crate::collect::CollectStep;
use crate::expr::Expr;

/// A snapshot of collected state, keyed by field name. Values are
/// arbitrary JSON; the engine interprets them only where a predicate
/// or step asks it to.
pub type TrapState = serde_json::Map<String, serde_json::Value>;

/// A complete trap definition: a label plus the two user programs.
/// Sources stay opaque text until compiled; a definition is immutable
/// once constructed and replaced only wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapDefinition {
    pub label: String,
    pub collector_source: String,
    pub predicate_source: String,
}

impl TrapDefinition {
    pub fn new(label: &str, collector_source: &str, predicate_source: &str) -> Self {
        Self {
            label: label.to_string(),
            collector_source: collector_source.to_string(),
            predicate_source: predicate_source.to_string(),
        }
    }
}

// ── Parsed documents ─────────────────────────────────────────────────

/// Parsed collector source: named steps, each producing one state field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectorDoc {
    pub fields: Vec<(String, CollectStep)>,
}

/// Parsed predicate source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateDoc {
    pub should_respond: Expr,
}
