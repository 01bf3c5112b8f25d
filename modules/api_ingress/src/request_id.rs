use apikit::XRequestId;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::{body::Body, middleware::Next, response::Response};

/// Returns the client's `x-request-id` if it is usable, otherwise a fresh UUID v4.
/// Empty (or whitespace-only) and non-visible-ASCII values count as absent.
pub fn resolve_request_id(headers: &HeaderMap) -> (String, HeaderValue) {
    let incoming = headers
        .get(XRequestId::header())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty());

    if let Some(rid) = incoming {
        if let Ok(value) = HeaderValue::from_str(rid) {
            return (rid.to_owned(), value);
        }
    }

    let rid = uuid::Uuid::new_v4().to_string();
    let value = HeaderValue::from_str(&rid).unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    (rid, value)
}

/// Assigns the correlation id to the request (header and extensions) and echoes
/// it on the response. Runs outside the access-log span, which reads the extension.
pub async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let (rid, value) = resolve_request_id(req.headers());

    req.headers_mut().insert(XRequestId::header(), value.clone());
    req.extensions_mut().insert(XRequestId(rid.clone()));

    let mut res = next.run(req).await;
    res.headers_mut().insert(XRequestId::header(), value);
    res
}
