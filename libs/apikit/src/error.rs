use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_db::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed validation rule. `field` is absent for body-level problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FieldViolation {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Every failure a handler can return.
///
/// The response built by `into_response` only carries the status; the body is
/// rendered by the error-normalization middleware, which reads the original
/// error from the [`ErrorReport`] response extension.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An application exception with its own status and client-safe message.
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        name: String,
    },

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("internal failure: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            name: exception_name(status).to_owned(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::http(StatusCode::CONFLICT, message)
    }

    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation(violations)
    }

    /// Status used before the filter chain resolves the final one.
    pub fn provisional_status(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Response extension carrying the failure a response was built from.
#[derive(Clone, Debug)]
pub struct ErrorReport(pub Arc<ApiError>);

impl ErrorReport {
    pub fn error(&self) -> &ApiError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut res = self.provisional_status().into_response();
        res.extensions_mut().insert(ErrorReport(Arc::new(self)));
        res
    }
}

/// Exception name conventionally associated with an HTTP status.
pub fn exception_name(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BadRequestException",
        StatusCode::UNAUTHORIZED => "UnauthorizedException",
        StatusCode::FORBIDDEN => "ForbiddenException",
        StatusCode::NOT_FOUND => "NotFoundException",
        StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowedException",
        StatusCode::REQUEST_TIMEOUT => "RequestTimeoutException",
        StatusCode::CONFLICT => "ConflictException",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLargeException",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UnsupportedMediaTypeException",
        StatusCode::UNPROCESSABLE_ENTITY => "UnprocessableEntityException",
        StatusCode::INTERNAL_SERVER_ERROR => "InternalServerErrorException",
        StatusCode::BAD_GATEWAY => "BadGatewayException",
        StatusCode::SERVICE_UNAVAILABLE => "ServiceUnavailableException",
        StatusCode::GATEWAY_TIMEOUT => "GatewayTimeoutException",
        _ => "HttpException",
    }
}
