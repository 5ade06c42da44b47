use snare_compiler::{compile_predicate, compile_trap};
use snare_ir::types::{TrapDefinition, TrapState};
use snare_sandbox::{Collector, Predicate, StateProvider};
use tracing::debug;

use crate::outcome::ExecutionOutcome;

/// One full execution cycle: compile the definition, collect state
/// through the provider, evaluate the predicate, classify.
///
/// Every failure in user logic or the provider becomes a `Failed`
/// outcome; this function itself never fails.
pub async fn run_cycle(
    definition: &TrapDefinition,
    provider: &dyn StateProvider,
) -> ExecutionOutcome {
    let outcome = execute(definition, provider).await;
    debug!(label = %definition.label, status = %outcome.status, "cycle finished");
    outcome
}

async fn execute(definition: &TrapDefinition, provider: &dyn StateProvider) -> ExecutionOutcome {
    let compiled = match compile_trap(definition) {
        Ok(compiled) => compiled,
        Err(e) => return ExecutionOutcome::failed(None, e),
    };

    let state = match Collector::new(compiled.collector).run(provider).await {
        Ok(state) => state,
        Err(e) => return ExecutionOutcome::failed(None, e),
    };

    match Predicate::new(compiled.predicate).run(&state) {
        Ok(true) => ExecutionOutcome::triggered(state),
        Ok(false) => ExecutionOutcome::safe(state),
        // The collected state survives so callers can see what the
        // predicate choked on.
        Err(e) => ExecutionOutcome::failed(Some(state), e),
    }
}

/// Evaluate only the predicate half of a definition against a
/// caller-supplied state snapshot. No provider is touched; the
/// classification rules match `run_cycle`.
pub fn evaluate_snapshot(definition: &TrapDefinition, state: TrapState) -> ExecutionOutcome {
    let plan = match compile_predicate(&definition.predicate_source) {
        Ok(plan) => plan,
        Err(e) => return ExecutionOutcome::failed(None, e),
    };
    match Predicate::new(plan).run(&state) {
        Ok(true) => ExecutionOutcome::triggered(state),
        Ok(false) => ExecutionOutcome::safe(state),
        Err(e) => ExecutionOutcome::failed(Some(state), e),
    }
}
