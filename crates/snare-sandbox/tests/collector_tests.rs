use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use snare_compiler::compile_collector;
use snare_sandbox::collector::{CollectionError, Collector};
use snare_sandbox::provider::{ProviderError, StateProvider};

/// Scripted provider for sandbox tests: canned per-method results plus
/// a record of the last call's params.
struct TestProvider {
    responses: HashMap<String, Result<Value, String>>,
    last_call: Mutex<Option<(String, Vec<Value>)>>,
}

impl TestProvider {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            last_call: Mutex::new(None),
        }
    }

    fn respond(mut self, method: &str, value: Value) -> Self {
        self.responses.insert(method.to_string(), Ok(value));
        self
    }

    fn fail(mut self, method: &str, message: &str) -> Self {
        self.responses
            .insert(method.to_string(), Err(message.to_string()));
        self
    }
}

#[async_trait]
impl StateProvider for TestProvider {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, ProviderError> {
        *self.last_call.lock().unwrap() = Some((method.to_string(), params.to_vec()));
        match self.responses.get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ProviderError::Fault { message: message.clone() }),
            None => Err(ProviderError::UnknownMethod { method: method.to_string() }),
        }
    }
}

fn make_collector(source: &str) -> Collector {
    Collector::new(compile_collector(source).expect("collector fixture must compile"))
}

#[tokio::test]
async fn test_collect_scaled_balance() {
    // 5 ETH in wei, as a node would return it
    let provider = TestProvider::new().respond("eth_getBalance", json!("0x4563918244f40000"));
    let collector = make_collector(
        r#"{"collect": {"ethBalance": ["scale", ["call", "eth_getBalance", ["0xabc", "latest"]], 18]}}"#,
    );
    let state = collector.run(&provider).await.unwrap();
    assert_eq!(state["ethBalance"], json!(5.0));
}

#[tokio::test]
async fn test_call_params_pass_through_verbatim() {
    let provider = TestProvider::new().respond("eth_call", json!("0x00"));
    let collector = make_collector(
        r#"{"collect": {"raw": ["call", "eth_call", [{"to": "0xdead", "data": "0x50d25bcd"}, "latest"]]}}"#,
    );
    collector.run(&provider).await.unwrap();
    let (method, params) = provider.last_call.lock().unwrap().clone().unwrap();
    assert_eq!(method, "eth_call");
    assert_eq!(params, vec![json!({"to": "0xdead", "data": "0x50d25bcd"}), json!("latest")]);
}

#[tokio::test]
async fn test_collect_word_extraction_and_sum() {
    // getReserves-style blob: reserve0 (40M USDC, 6 decimals),
    // reserve1 (12k WETH, 18 decimals), blockTimestampLast.
    let blob = "0x0000000000000000000000000000000000000000000000000000246139ca800000000000000000000000000000000000000000000000028a857425466f800000000000000000000000000000000000000000000000000000000000006553f100";
    let provider = TestProvider::new().respond("eth_call", json!(blob));
    let collector = make_collector(
        r#"{"collect": {"tvlUSD": ["sum",
            ["scale", ["word", ["call", "eth_call", [{"to": "0xpair", "data": "0x0902f1ac"}, "latest"]], 0], 6],
            ["scale", ["word", ["call", "eth_call", [{"to": "0xpair", "data": "0x0902f1ac"}, "latest"]], 1], 18]
        ]}}"#,
    );
    let state = collector.run(&provider).await.unwrap();
    assert_eq!(state["tvlUSD"], json!(40012000.0));
}

#[tokio::test]
async fn test_collect_provider_fault_carries_cause() {
    let provider = TestProvider::new().fail("eth_getBalance", "RPC timeout");
    let collector =
        make_collector(r#"{"collect": {"ethBalance": ["call", "eth_getBalance", ["0xabc"]]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    assert!(matches!(err, CollectionError::Provider(_)));
    assert!(err.to_string().contains("RPC timeout"), "{err}");
}

#[tokio::test]
async fn test_collect_unknown_method() {
    let provider = TestProvider::new();
    let collector = make_collector(r#"{"collect": {"x": ["call", "eth_gasPrice"]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    assert!(err.to_string().contains("eth_gasPrice"), "{err}");
}

#[tokio::test]
async fn test_collect_index_into_array_result() {
    let provider = TestProvider::new().respond("reserves", json!(["0x1", "0x2", 1700000000]));
    let collector =
        make_collector(r#"{"collect": {"reserve1": ["scale", ["index", ["call", "reserves"], 1], 0]}}"#);
    let state = collector.run(&provider).await.unwrap();
    assert_eq!(state["reserve1"], json!(2.0));
}

#[tokio::test]
async fn test_collect_index_out_of_range() {
    let provider = TestProvider::new().respond("reserves", json!(["0x1"]));
    let collector = make_collector(r#"{"collect": {"x": ["index", ["call", "reserves"], 5]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    assert!(matches!(err, CollectionError::IndexOutOfRange { index: 5, len: 1 }));
}

#[tokio::test]
async fn test_collect_word_out_of_range() {
    let provider = TestProvider::new().respond("eth_call", json!(format!("0x{}", "00".repeat(32))));
    let collector = make_collector(r#"{"collect": {"x": ["word", ["call", "eth_call"], 3]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    assert!(matches!(err, CollectionError::WordOutOfRange { index: 3, words: 1 }));
}

#[tokio::test]
async fn test_collect_word_rejects_non_hex() {
    let provider = TestProvider::new().respond("eth_call", json!("not hex at all"));
    let collector = make_collector(r#"{"collect": {"x": ["word", ["call", "eth_call"], 0]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    assert!(matches!(err, CollectionError::NotHex { .. }));
}

#[tokio::test]
async fn test_collect_malformed_quantity() {
    let provider = TestProvider::new().respond("eth_getBalance", json!("plenty of eth"));
    let collector =
        make_collector(r#"{"collect": {"x": ["scale", ["call", "eth_getBalance"], 18]}}"#);
    let err = collector.run(&provider).await.unwrap_err();
    match &err {
        CollectionError::MalformedQuantity { got } => assert_eq!(got, "plenty of eth"),
        other => panic!("expected quantity error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_collect_decimal_string_quantity() {
    let provider = TestProvider::new().respond("price", json!("12.5"));
    let collector = make_collector(r#"{"collect": {"x": ["scale", ["call", "price"], 0]}}"#);
    let state = collector.run(&provider).await.unwrap();
    assert_eq!(state["x"], json!(12.5));
}

#[tokio::test]
async fn test_collect_now_is_epoch_millis() {
    let collector = make_collector(r#"{"collect": {"timestamp": ["now"]}}"#);
    let state = collector.run(&TestProvider::new()).await.unwrap();
    let ts = state["timestamp"].as_i64().unwrap();
    // After 2023-01-01 and within this century.
    assert!(ts > 1_672_531_200_000);
    assert!(ts < 4_102_444_800_000);
}

#[tokio::test]
async fn test_collect_const_and_multiple_fields() {
    let provider = TestProvider::new().respond("eth_blockNumber", json!("0x10"));
    let collector = make_collector(
        r#"{"collect": {
            "chain": ["const", "mainnet"],
            "block": ["scale", ["call", "eth_blockNumber"], 0]
        }}"#,
    );
    let state = collector.run(&provider).await.unwrap();
    assert_eq!(state["chain"], json!("mainnet"));
    assert_eq!(state["block"], json!(16.0));
    assert_eq!(state.len(), 2);
}

#[tokio::test]
async fn test_collect_huge_hex_word_still_scales() {
    // A full 32-byte value beyond u128: precision degrades, order of
    // magnitude survives.
    let blob = format!("0x{}", "ff".repeat(32));
    let provider = TestProvider::new().respond("eth_call", json!(blob));
    let collector =
        make_collector(r#"{"collect": {"x": ["scale", ["word", ["call", "eth_call"], 0], 18]}}"#);
    let state = collector.run(&provider).await.unwrap();
    let x = state["x"].as_f64().unwrap();
    assert!(x > 1e50);
}
