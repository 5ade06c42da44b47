use std::sync::Arc;

use serde_json::json;
use snare_compiler::compile_trap;
use snare_engine::cycle::{evaluate_snapshot, run_cycle};
use snare_engine::outcome::OutcomeStatus;
use snare_engine::presets::{presets, snapshot_presets};
use snare_ir::types::{TrapDefinition, TrapState};
use snare_provider::StaticProvider;

fn definition(collector: &str, predicate: &str) -> TrapDefinition {
    TrapDefinition::new("test trap", collector, predicate)
}

fn state_from(value: serde_json::Value) -> TrapState {
    value.as_object().cloned().unwrap()
}

// ── Full cycles against a scripted provider ─────────────────────────

#[tokio::test]
async fn test_cycle_triggered_on_low_balance() {
    let provider = StaticProvider::new().with_response("eth_getBalance", json!("0x4563918244f40000"));
    let def = presets()[0].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Triggered);
    assert_eq!(outcome.message, "Trap triggered");
    let state = outcome.state.unwrap();
    assert_eq!(state["ethBalance"], json!(5.0));
    assert!(state.contains_key("timestamp"));
}

#[tokio::test]
async fn test_cycle_safe_on_high_balance() {
    let provider = StaticProvider::new().with_response("eth_getBalance", json!("0x2b5e3af16b1880000"));
    let def = presets()[0].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Safe);
    assert_eq!(outcome.message, "Trap not triggered");
    assert_eq!(outcome.state.unwrap()["ethBalance"], json!(50.0));
}

#[tokio::test]
async fn test_cycle_failed_on_provider_fault() {
    let provider = StaticProvider::new().with_fault("eth_getBalance", "RPC timeout");
    let def = presets()[0].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.state.is_none());
    assert!(outcome.message.starts_with("Error: "));
    assert!(outcome.message.contains("RPC timeout"));
}

#[tokio::test]
async fn test_cycle_failed_on_missing_predicate_field() {
    let provider = StaticProvider::new();
    let def = definition(
        r#"{"collect": {"price": ["const", 5]}}"#,
        r#"{"should_respond": ["lt", ["field", "volume"], 10]}"#,
    );

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.message, "Error: Field not found: volume");
    // Collection finished, so the state the predicate saw survives.
    assert_eq!(outcome.state.unwrap()["price"], json!(5));
}

#[tokio::test]
async fn test_cycle_failed_on_unparseable_collector() {
    let provider = StaticProvider::new();
    let def = definition("not json at all", r#"{"should_respond": true}"#);

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.state.is_none());
    assert!(outcome.message.contains("Parse error"));
}

#[tokio::test]
async fn test_cycle_failed_on_predicate_arity_error() {
    let provider = StaticProvider::new();
    let def = definition(
        r#"{"collect": {"price": ["const", 5]}}"#,
        r#"{"should_respond": ["lt", ["field", "price"]]}"#,
    );

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.message.contains("Validation errors"));
    assert!(outcome.message.contains("'lt' requires exactly 2"));
}

#[tokio::test]
async fn test_cycle_skips_provider_when_compile_fails() {
    let provider = StaticProvider::new().with_response("eth_getBalance", json!("0x0"));
    let def = definition("{broken", r#"{"should_respond": true}"#);

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(provider.call_count(), 0);
}

// ── Preset cycles ───────────────────────────────────────────────────

#[test]
fn test_all_presets_compile() {
    for preset in presets() {
        compile_trap(&preset.definition())
            .unwrap_or_else(|e| panic!("preset '{}' failed to compile: {e}", preset.label));
    }
}

#[tokio::test]
async fn test_chainlink_preset_triggers_below_threshold() {
    // latestAnswer scaled by 8 decimals: 19500.0, below the 20000 line.
    let provider = StaticProvider::new().with_response("eth_call", json!("0x1c6050eac00"));
    let def = presets()[2].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Triggered);
    assert_eq!(outcome.state.unwrap()["btcPrice"], json!(19500.0));
}

#[tokio::test]
async fn test_chainlink_preset_safe_above_threshold() {
    let provider = StaticProvider::new().with_response("eth_call", json!("0x5d4fd8bc040"));
    let def = presets()[2].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Safe);
    assert_eq!(outcome.state.unwrap()["btcPrice"], json!(64123.45));
}

#[tokio::test]
async fn test_uniswap_preset_sums_scaled_reserves() {
    // getReserves blob: reserve0 4e13 raw (6 decimals), reserve1
    // 12000e18 raw (18 decimals), then the pair timestamp word.
    let reserves = "0x0000000000000000000000000000000000000000000000000000246139ca8000\
00000000000000000000000000000000000000000000028a857425466f800000\
000000000000000000000000000000000000000000000000000000006553f100";
    let provider = StaticProvider::new().with_response("eth_call", json!(reserves));
    let def = presets()[3].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Safe);
    assert_eq!(outcome.state.unwrap()["tvlUSD"], json!(40012000.0));
}

#[tokio::test]
async fn test_lido_preset_safe_on_normal_stake() {
    let provider = StaticProvider::new().with_response("eth_call", json!("0x7b15a029cd83b8c800000"));
    let def = presets()[4].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Safe);
    assert_eq!(outcome.state.unwrap()["totalStakedETH"], json!(9300000.0));
}

#[tokio::test]
async fn test_peg_preset_triggers_on_depeg() {
    // get_dy of one stETH comes back as 0.97 ETH, outside the band.
    let provider = StaticProvider::new().with_response("eth_call", json!("0xd7621dc58210000"));
    let def = presets()[5].definition();

    let outcome = run_cycle(&def, &provider).await;

    assert_eq!(outcome.status, OutcomeStatus::Triggered);
    assert_eq!(outcome.state.unwrap()["pegRatio"], json!(0.97));
}

// ── Snapshot evaluation ─────────────────────────────────────────────

#[test]
fn test_evaluate_snapshot_triggered() {
    let def = definition(
        r#"{"collect": {}}"#,
        r#"{"should_respond": ["lt", ["field", "oraclePrice"], 20000]}"#,
    );
    let state = state_from(json!({ "oraclePrice": 19500 }));

    let outcome = evaluate_snapshot(&def, state);

    assert_eq!(outcome.status, OutcomeStatus::Triggered);
    assert_eq!(outcome.message, "Trap triggered");
}

#[test]
fn test_evaluate_snapshot_safe() {
    let def = definition(
        r#"{"collect": {}}"#,
        r#"{"should_respond": ["lt", ["field", "oraclePrice"], 20000]}"#,
    );
    let state = state_from(json!({ "oraclePrice": 21000 }));

    let outcome = evaluate_snapshot(&def, state);

    assert_eq!(outcome.status, OutcomeStatus::Safe);
}

#[test]
fn test_evaluate_snapshot_missing_field_keeps_state() {
    let def = definition(
        r#"{"collect": {}}"#,
        r#"{"should_respond": ["lt", ["field", "oraclePrice"], 20000]}"#,
    );
    let state = state_from(json!({ "somethingElse": 1 }));

    let outcome = evaluate_snapshot(&def, state);

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.message, "Error: Field not found: oraclePrice");
    assert_eq!(outcome.state.unwrap()["somethingElse"], json!(1));
}

#[test]
fn test_evaluate_snapshot_bad_predicate_source() {
    let def = definition(r#"{"collect": {}}"#, "{{{");
    let outcome = evaluate_snapshot(&def, TrapState::new());

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.state.is_none());
}

#[test]
fn test_snapshot_presets_trigger_on_their_samples() {
    for preset in snapshot_presets() {
        let def = TrapDefinition::new(preset.label, r#"{"collect": {}}"#, preset.predicate_source);
        let state: TrapState = serde_json::from_str(preset.sample_state)
            .unwrap_or_else(|e| panic!("sample for '{}' is not an object: {e}", preset.label));

        let outcome = evaluate_snapshot(&def, state);

        assert_eq!(
            outcome.status,
            OutcomeStatus::Triggered,
            "snapshot preset '{}' should trigger on its sample",
            preset.label
        );
    }
}

#[test]
fn test_lending_preset_needs_truthy_loan_id() {
    let preset = &snapshot_presets()[3];
    let def = TrapDefinition::new(preset.label, r#"{"collect": {}}"#, preset.predicate_source);

    // Ratio is below threshold but the loan id is empty, which the
    // bare field reference coerces to false.
    let state = state_from(json!({ "loanId": "", "collateralRatio": 1.1 }));
    let outcome = evaluate_snapshot(&def, state);

    assert_eq!(outcome.status, OutcomeStatus::Safe);
}

// The run_cycle path through a session-free Arc provider, matching how
// the scheduler holds it.
#[tokio::test]
async fn test_cycle_through_shared_provider() {
    let provider: Arc<StaticProvider> =
        Arc::new(StaticProvider::new().with_response("eth_getBalance", json!("0x4563918244f40000")));
    let def = presets()[0].definition();

    let outcome = run_cycle(&def, provider.as_ref()).await;

    assert_eq!(outcome.status, OutcomeStatus::Triggered);
    assert_eq!(provider.call_count(), 1);
}
