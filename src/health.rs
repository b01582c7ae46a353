//! Liveness probe

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
