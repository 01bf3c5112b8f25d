//! The two JSON shapes every response body takes.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::context::RequestMeta;
use crate::error::FieldViolation;

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub method: String,
    pub message: String,
    pub error_name: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

impl ErrorResponse {
    pub fn new(
        meta: &RequestMeta,
        status: StatusCode,
        message: impl Into<String>,
        error_name: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            timestamp: timestamp_now(),
            path: meta.path.clone(),
            method: meta.method.to_string(),
            message: message.into(),
            error_name: error_name.into(),
            request_id: meta.request_id.clone(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_response(status, &self)
    }
}

/// Body of every successful request that carries content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope {
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub method: String,
    pub request_id: String,
    pub message: String,
    pub data: serde_json::Value,
}

impl SuccessEnvelope {
    pub const DEFAULT_MESSAGE: &'static str = "Success";

    pub fn new(
        meta: &RequestMeta,
        status: StatusCode,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            timestamp: timestamp_now(),
            path: meta.path.clone(),
            method: meta.method.to_string(),
            request_id: meta.request_id.clone(),
            message: message.into(),
            data,
        }
    }
}

/// RFC 3339 UTC with millisecond precision, e.g. `2025-01-31T10:00:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize `body` as the full response with explicit `content-length`.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let len = bytes.len();
            let mut res = (status, bytes).into_response();
            let headers = res.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
            res
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn meta() -> RequestMeta {
        RequestMeta {
            method: Method::POST,
            path: "/api/v1/products".into(),
            request_id: "rid-7".into(),
        }
    }

    #[test]
    fn error_response_serializes_camel_case_without_errors() {
        let body = ErrorResponse::new(
            &meta(),
            StatusCode::NOT_FOUND,
            "missing",
            "NotFoundException",
        );
        let v = serde_json::to_value(&body).unwrap();

        assert_eq!(v["statusCode"], 404);
        assert_eq!(v["path"], "/api/v1/products");
        assert_eq!(v["method"], "POST");
        assert_eq!(v["message"], "missing");
        assert_eq!(v["errorName"], "NotFoundException");
        assert_eq!(v["requestId"], "rid-7");
        assert!(v.get("errors").is_none());
        assert!(v["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn error_response_lists_field_errors() {
        let body = ErrorResponse::new(
            &meta(),
            StatusCode::BAD_REQUEST,
            "Validation failed",
            "BadRequestException",
        )
        .with_errors(vec![
            FieldViolation::field("country", "country should not be empty"),
            FieldViolation::general("body must be a JSON object"),
        ]);
        let v = serde_json::to_value(&body).unwrap();

        assert_eq!(
            v["errors"],
            json!([
                { "field": "country", "message": "country should not be empty" },
                { "message": "body must be a JSON object" }
            ])
        );
    }

    #[test]
    fn json_response_sets_headers() {
        let res = json_response(StatusCode::CREATED, &json!({ "a": 1 }));
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        assert_eq!(res.headers()[header::CONTENT_LENGTH], "7");
    }
}
