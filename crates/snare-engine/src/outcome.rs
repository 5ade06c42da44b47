use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snare_ir::types::TrapState;

/// Classification of one execution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The predicate held: the trap would respond.
    Triggered,
    /// The cycle completed and the predicate did not hold.
    Safe,
    /// Compilation, collection, or evaluation failed.
    Failed,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Triggered => write!(f, "triggered"),
            OutcomeStatus::Safe => write!(f, "safe"),
            OutcomeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The record of one execution cycle: when it ran, how it classified,
/// what state it saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub timestamp: DateTime<Utc>,
    pub status: OutcomeStatus,
    /// The collected state. Absent when the cycle failed before
    /// collection completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TrapState>,
    pub message: String,
}

impl ExecutionOutcome {
    pub fn triggered(state: TrapState) -> Self {
        Self {
            timestamp: Utc::now(),
            status: OutcomeStatus::Triggered,
            state: Some(state),
            message: "Trap triggered".to_string(),
        }
    }

    pub fn safe(state: TrapState) -> Self {
        Self {
            timestamp: Utc::now(),
            status: OutcomeStatus::Safe,
            state: Some(state),
            message: "Trap not triggered".to_string(),
        }
    }

    /// `state` is `Some` only when collection finished before the
    /// failure, so callers can still inspect what the predicate saw.
    pub fn failed(state: Option<TrapState>, cause: impl std::fmt::Display) -> Self {
        Self {
            timestamp: Utc::now(),
            status: OutcomeStatus::Failed,
            state,
            message: format!("Error: {cause}"),
        }
    }
}
