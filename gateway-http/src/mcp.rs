use gateway_mcp::{handle_request, JsonRpcRequest};
use gateway_web::{Json, State, StatusCode};

use crate::router::GatewayState;

/// `POST /mcp` — the gateway's single JSON-RPC entry point for
/// `tools/list`/`tools/call` (§4.7). Status is driven entirely by the
/// outcome gateway-mcp computes: 200 for `tools/list` and a successful
/// handler call, 500 for a route-only or unknown tool.
pub async fn mcp_handler(State(state): State<GatewayState>, Json(request): Json<JsonRpcRequest>) -> (StatusCode, Json<serde_json::Value>) {
    let outcome = handle_request(&state.tools, request).await;
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.body))
}
