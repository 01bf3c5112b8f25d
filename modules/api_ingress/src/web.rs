use std::any::Any;

use apikit::ApiError;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

/// Greeting served at the API prefix.
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello API" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": apikit::timestamp_now()
    }))
}

/// Fallback for unknown paths and for known paths hit with an unsupported method.
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {method} {}", uri.path()))
}

/// Turns a handler panic into a reported internal failure.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };
    ApiError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
