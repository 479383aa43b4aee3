use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

// Handler modules, one per resource, mirroring the route segregation.
pub mod accounts;
pub mod airlines;
pub mod auth;
pub mod payments;
pub mod sales;
pub mod suppliers;

/// Wraps a payload in the standard success envelope.
pub(crate) fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope carrying only a human-readable message.
pub(crate) fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}
