use apikit::{json_response, ApiError, RequestMeta, SuccessEnvelope};
use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::filters::carry_headers;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// A payload shaped exactly as `{ message, data }` keeps its own message.
pub fn envelope_for(meta: &RequestMeta, status: StatusCode, payload: Value) -> SuccessEnvelope {
    if let Value::Object(map) = &payload {
        if map.len() == 2 {
            if let (Some(Value::String(message)), Some(data)) = (map.get("message"), map.get("data")) {
                return SuccessEnvelope::new(meta, status, message.clone(), data.clone());
            }
        }
    }
    SuccessEnvelope::new(meta, status, SuccessEnvelope::DEFAULT_MESSAGE, payload)
}

/// Wraps every non-error JSON body in the success envelope.
/// `204`, empty and non-JSON bodies pass through untouched.
pub async fn wrap_success(req: Request<Body>, next: Next) -> Response {
    let meta = RequestMeta::from_request(&req);
    let res = next.run(req).await;

    let status = res.status();
    if status.is_client_error()
        || status.is_server_error()
        || status == StatusCode::NO_CONTENT
        || !is_json(res.headers())
    {
        return res;
    }

    let (parts, body) = res.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            return ApiError::Internal(anyhow::anyhow!("failed to buffer response body: {e}"))
                .into_response()
        }
    };
    if bytes.is_empty() {
        return Response::from_parts(parts, Body::empty());
    }
    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    let mut wrapped = json_response(status, &envelope_for(&meta, status, payload));
    carry_headers(&parts.headers, wrapped.headers_mut());
    wrapped.extensions_mut().extend(parts.extensions);
    wrapped
}
