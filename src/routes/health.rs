use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// Returns a static JSON body so load balancers and container probes can
/// confirm the process is serving requests. It does not touch the store.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status":"pong"}`
///
/// # Examples
/// ```bash
/// curl http://localhost:3000/ping
/// # Response: {"status":"pong"}
/// ```
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}
