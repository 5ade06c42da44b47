//! MCP facade: a JSON-RPC request handler exposing the trap engine as
//! a tool server. Transport is the caller's concern; this module maps
//! request values to response values.

use std::sync::Arc;

use serde_json::{json, Value};

use snare_ir::types::TrapDefinition;
use snare_sandbox::StateProvider;

use crate::config::SessionConfig;
use crate::cycle::evaluate_snapshot;
use crate::outcome::ExecutionOutcome;
use crate::presets::{presets, snapshot_presets};
use crate::session::TrapSession;

/// Server-side state shared across requests.
pub struct McpState {
    pub session: TrapSession,
}

impl McpState {
    /// Boots with the first catalog preset loaded, like a fresh
    /// engine instance.
    pub fn new(provider: Arc<dyn StateProvider>) -> Self {
        Self::with_config(provider, SessionConfig::default())
    }

    pub fn with_config(provider: Arc<dyn StateProvider>, config: SessionConfig) -> Self {
        let definition = presets()[0].definition();
        Self {
            session: TrapSession::new(definition, provider, config),
        }
    }
}

pub async fn handle_request(req: &Value, state: &McpState) -> Value {
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let method = req.get("method").and_then(|m| m.as_str()).unwrap_or("");

    match method {
        "initialize" => json_rpc_result(id, handle_initialize()),
        "tools/list" => json_rpc_result(id, handle_tools_list()),
        "tools/call" => {
            let params = req.get("params").cloned().unwrap_or_else(|| json!({}));
            match params.get("name").and_then(|n| n.as_str()) {
                Some(tool_name) => {
                    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                    json_rpc_result(id, handle_tool(tool_name, &arguments, state).await)
                }
                None => json_rpc_error(id, -32602, "Invalid params: missing tool name"),
            }
        }
        _ => json_rpc_error(id, -32601, "Method not found"),
    }
}

fn handle_initialize() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "serverInfo": {
            "name": "snare-engine",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "tools": {}
        }
    })
}

fn handle_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": "trap_presets",
                "description": "List the preset trap catalog and the snapshot preset catalog",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_select_preset",
                "description": "Load a catalog preset as the active trap definition",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "index": { "type": "integer", "description": "Position in the preset catalog" }
                    },
                    "required": ["index"]
                }
            },
            {
                "name": "trap_set_definition",
                "description": "Load a custom trap definition from collector and predicate sources",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string" },
                        "collector_source": { "type": "string", "description": "JSON collector document" },
                        "predicate_source": { "type": "string", "description": "JSON predicate document" }
                    },
                    "required": ["collector_source", "predicate_source"]
                }
            },
            {
                "name": "trap_run_once",
                "description": "Execute one cycle of the active trap immediately and return the outcome",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_start",
                "description": "Start the periodic execution stream for the active trap",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_stop",
                "description": "Stop the periodic execution stream",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_status",
                "description": "Report the active definition, stream state, and log fill",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_log",
                "description": "Return the observation log, newest outcome first",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "trap_evaluate_snapshot",
                "description": "Evaluate the active predicate against a caller-supplied state object, no provider calls",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "state": { "type": "object", "description": "State snapshot the predicate sees" }
                    },
                    "required": ["state"]
                }
            }
        ]
    })
}

async fn handle_tool(tool_name: &str, arguments: &Value, state: &McpState) -> Value {
    match tool_name {
        "trap_presets" => tool_presets(),
        "trap_select_preset" => tool_select_preset(arguments, state),
        "trap_set_definition" => tool_set_definition(arguments, state),
        "trap_run_once" => tool_run_once(state).await,
        "trap_start" => tool_start(state),
        "trap_stop" => tool_stop(state),
        "trap_status" => tool_status(state),
        "trap_log" => tool_log(state),
        "trap_evaluate_snapshot" => tool_evaluate_snapshot(arguments, state),
        other => error_content(format!("Unknown tool: {other}")),
    }
}

// ── Tool implementations ────────────────────────────────────────────

fn tool_presets() -> Value {
    let catalog: Vec<Value> = presets()
        .iter()
        .enumerate()
        .map(|(index, preset)| json!({ "index": index, "label": preset.label }))
        .collect();
    let snapshots: Vec<Value> = snapshot_presets()
        .iter()
        .map(|preset| {
            json!({
                "label": preset.label,
                "predicate_source": preset.predicate_source,
                "sample_state": preset.sample_state,
            })
        })
        .collect();
    text_content(json!({ "presets": catalog, "snapshot_presets": snapshots }))
}

fn tool_select_preset(arguments: &Value, state: &McpState) -> Value {
    let index = arguments.get("index").and_then(Value::as_u64);
    match index.and_then(|i| presets().get(i as usize)) {
        Some(preset) => {
            state.session.set_definition(preset.definition());
            text_content(json!({ "selected": preset.label }))
        }
        None => error_content(format!(
            "No preset at index {}",
            arguments.get("index").cloned().unwrap_or(Value::Null)
        )),
    }
}

fn tool_set_definition(arguments: &Value, state: &McpState) -> Value {
    let collector = arguments.get("collector_source").and_then(Value::as_str);
    let predicate = arguments.get("predicate_source").and_then(Value::as_str);
    match (collector, predicate) {
        (Some(collector), Some(predicate)) => {
            let label = arguments
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or("Custom Trap");
            state
                .session
                .set_definition(TrapDefinition::new(label, collector, predicate));
            text_content(json!({ "loaded": label }))
        }
        _ => error_content("collector_source and predicate_source are required".to_string()),
    }
}

async fn tool_run_once(state: &McpState) -> Value {
    let outcome = state.session.run_once().await;
    text_content(outcome_json(&outcome))
}

fn tool_start(state: &McpState) -> Value {
    let was_active = state.session.is_active();
    state.session.start();
    let status = if was_active { "already_active" } else { "started" };
    text_content(json!({ "status": status }))
}

fn tool_stop(state: &McpState) -> Value {
    let was_active = state.session.is_active();
    state.session.stop();
    let status = if was_active { "stopped" } else { "not_active" };
    text_content(json!({ "status": status }))
}

fn tool_status(state: &McpState) -> Value {
    let session = &state.session;
    text_content(json!({
        "active": session.is_active(),
        "label": session.definition().label.clone(),
        "interval_secs": session.config().tick_interval.as_secs_f64(),
        "log_length": session.log_len(),
        "log_capacity": session.config().log_capacity,
    }))
}

fn tool_log(state: &McpState) -> Value {
    let entries: Vec<Value> = state
        .session
        .snapshot()
        .iter()
        .map(outcome_json)
        .collect();
    text_content(json!({ "entries": entries }))
}

fn tool_evaluate_snapshot(arguments: &Value, state: &McpState) -> Value {
    match arguments.get("state").and_then(Value::as_object) {
        Some(snapshot) => {
            let definition = state.session.definition();
            let outcome = evaluate_snapshot(&definition, snapshot.clone());
            text_content(outcome_json(&outcome))
        }
        None => error_content("state must be a JSON object".to_string()),
    }
}

// ── Envelope helpers ────────────────────────────────────────────────

fn outcome_json(outcome: &ExecutionOutcome) -> Value {
    serde_json::to_value(outcome).unwrap_or(Value::Null)
}

fn text_content(payload: Value) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": payload.to_string(),
        }]
    })
}

fn error_content(message: String) -> Value {
    json!({
        "isError": true,
        "content": [{
            "type": "text",
            "text": json!({ "error": message }).to_string(),
        }]
    })
}

fn json_rpc_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn json_rpc_error(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        }
    })
}
