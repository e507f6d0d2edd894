use serde::Deserialize;
use serde_json::{json, Value};

use crate::registry::ToolRegistry;
use crate::tool::ToolKind;

/// A single JSON-RPC request to the `/mcp` endpoint. `id` is echoed back
/// verbatim (JSON-RPC allows it to be a string, number, or null); the
/// gateway doesn't interpret it.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The outcome of handling one JSON-RPC call: the HTTP status the caller
/// should see (200 for a successful handler call or `tools/list`, 500 for
/// a route-only or unknown tool per §4.7) and the JSON-RPC response body.
pub struct RpcOutcome {
    pub status: u16,
    pub body: Value,
}

fn rpc_result(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn rpc_error(id: &Value, message: String) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32000, "message": message } })
}

/// `tools/list` — every registered tool's public descriptor.
pub fn tools_list(registry: &ToolRegistry) -> Value {
    json!({ "tools": registry.iter().map(|t| t.descriptor()).collect::<Vec<_>>() })
}

/// `tools/call {name, arguments}` per §4.7:
/// - a handler-backed tool is invoked and its result wrapped in a content
///   block, status 200;
/// - a route-only tool fails with a message naming both "route-only" and
///   its REST path, status 500;
/// - an unknown name fails with `"Unknown tool: …"`, status 500.
pub async fn tools_call(registry: &ToolRegistry, params: ToolsCallParams) -> Result<Value, String> {
    let Some(tool) = registry.get(&params.name) else {
        return Err(format!("Unknown tool: {}", params.name));
    };

    match &tool.kind {
        ToolKind::Handler(handler) => {
            let result = handler.call(params.arguments).await.map_err(|e| e.to_string())?;
            Ok(json!({ "content": [ { "type": "json", "json": result } ] }))
        }
        ToolKind::RouteOnly(route) => {
            Err(format!("'{}' is route-only; use the REST endpoint {} instead", params.name, route.path))
        }
    }
}

/// Dispatch a whole JSON-RPC request against a registry, producing the
/// HTTP status and response body the `/mcp` handler should emit.
pub async fn handle_request(registry: &ToolRegistry, request: JsonRpcRequest) -> RpcOutcome {
    match request.method.as_str() {
        "tools/list" => RpcOutcome { status: 200, body: rpc_result(&request.id, tools_list(registry)) },
        "tools/call" => {
            let params: ToolsCallParams = match serde_json::from_value(request.params) {
                Ok(p) => p,
                Err(e) => return RpcOutcome { status: 400, body: rpc_error(&request.id, format!("invalid params: {e}")) },
            };
            match tools_call(registry, params).await {
                Ok(result) => RpcOutcome { status: 200, body: rpc_result(&request.id, result) },
                Err(message) => RpcOutcome { status: 500, body: rpc_error(&request.id, message) },
            }
        }
        other => RpcOutcome { status: 400, body: rpc_error(&request.id, format!("Unknown method: {other}")) },
    }
}
