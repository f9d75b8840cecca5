use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "ConVerge API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "storage": "in-memory",
    }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
