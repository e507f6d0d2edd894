use gateway_http::GatewayState;
use gateway_web::{Json, State, StatusCode};

/// `GET /healthz` — a liveness probe that also pings the root-scope
/// `Store` handle, grounded on `r2e_core::health`'s aggregated-status
/// shape (simplified to one check: can this gateway reach its store at
/// all). Returns 200 with `{"status":"UP", ...}` or 503 with
/// `{"status":"DOWN", "reason": ...}` — never panics on a store error.
pub async fn healthz_handler(State(state): State<GatewayState>) -> (StatusCode, Json<serde_json::Value>) {
    let store = state.providers.store_for(None);
    let Some(model) = state.schema.values().next() else {
        return (StatusCode::OK, Json(serde_json::json!({ "status": "UP", "models": 0 })));
    };

    match store.count(&model.plural, None).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "status": "UP" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "DOWN", "reason": e.to_string() })),
        ),
    }
}
