//! Error normalization: every failed request leaves with an [`ErrorResponse`].
//!
//! Handlers return [`ApiError`]; its `IntoResponse` impl only sets a provisional
//! status and attaches an [`ErrorReport`]. The middleware below runs the report
//! through the filter chain (store failures first, then the catch-all) and
//! renders the final body. Error responses without a report (router rejections,
//! body-limit and timeout layers) are resolved from their status alone.

use apikit::{exception_name, ApiError, ErrorReport, ErrorResponse, FieldViolation, RequestMeta};
use axum::http::{header, HeaderMap, StatusCode};
use axum::{body::Body, extract::Request, middleware::Next, response::IntoResponse, response::Response};
use catalog_db::{StoreError, StoreErrorKind};

/// `errorName` values allowed to reach clients; anything else becomes `ServerException`.
pub const SAFE_ERROR_NAMES: &[&str] = &[
    "BadRequestException",
    "UnauthorizedException",
    "ForbiddenException",
    "NotFoundException",
    "ConflictException",
    "GatewayTimeoutException",
    "InternalServerErrorException",
    "QueryFailedError",
    "EntityNotFoundError",
];

pub const FALLBACK_ERROR_NAME: &str = "ServerException";

pub fn sanitize_error_name(name: &str) -> &str {
    if SAFE_ERROR_NAMES.contains(&name) {
        name
    } else {
        FALLBACK_ERROR_NAME
    }
}

/// The client-facing outcome of a failure plus the internal detail for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: StatusCode,
    pub message: String,
    pub error_name: String,
    pub errors: Option<Vec<FieldViolation>>,
    pub detail: String,
}

impl Resolution {
    fn new(status: StatusCode, message: impl Into<String>, error_name: &str) -> Self {
        let message = message.into();
        Self {
            status,
            detail: message.clone(),
            message,
            error_name: sanitize_error_name(error_name).to_owned(),
            errors: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// For error responses that carry no [`ErrorReport`].
    pub fn from_status(status: StatusCode) -> Self {
        let message = status.canonical_reason().unwrap_or("Error");
        Self::new(status, message, exception_name(status))
    }

    pub fn render(self, meta: &RequestMeta) -> ErrorResponse {
        let body = ErrorResponse::new(meta, self.status, self.message, self.error_name);
        match self.errors {
            Some(errors) => body.with_errors(errors),
            None => body,
        }
    }
}

/// One stage of the chain. Returns `None` to let the next stage decide.
pub trait ExceptionFilter: Send + Sync {
    fn catch(&self, err: &ApiError) -> Option<Resolution>;
}

/// Maps classified store failures to client-safe statuses and messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreErrorFilter;

impl StoreErrorFilter {
    pub fn resolve(err: &StoreError) -> Resolution {
        let (status, message, name) = match err.kind {
            StoreErrorKind::UniqueViolation => (
                StatusCode::CONFLICT,
                "Duplicate entry: A record with the same unique identifier already exists",
                "QueryFailedError",
            ),
            StoreErrorKind::ForeignKeyViolation => (
                StatusCode::BAD_REQUEST,
                "Referenced record does not exist",
                "QueryFailedError",
            ),
            StoreErrorKind::InvalidTextRepresentation => {
                (StatusCode::BAD_REQUEST, "Invalid data format", "QueryFailedError")
            }
            StoreErrorKind::DataException => {
                (StatusCode::BAD_REQUEST, "Invalid data value", "QueryFailedError")
            }
            StoreErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "Entity not found", "EntityNotFoundError")
            }
            StoreErrorKind::Other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "QueryFailedError",
            ),
        };
        let detail = match &err.code {
            Some(code) => format!("[{code}] {}", err.detail),
            None => err.detail.clone(),
        };
        Resolution::new(status, message, name).with_detail(detail)
    }
}

impl ExceptionFilter for StoreErrorFilter {
    fn catch(&self, err: &ApiError) -> Option<Resolution> {
        match err {
            ApiError::Store(store) => Some(Self::resolve(store)),
            _ => None,
        }
    }
}

/// Catch-all: HTTP exceptions keep their status and message, everything else
/// is an opaque 500.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpErrorFilter;

impl HttpErrorFilter {
    pub fn resolve(err: &ApiError) -> Resolution {
        match err {
            ApiError::Http {
                status,
                message,
                name,
            } => Resolution::new(*status, message.clone(), name),
            ApiError::Validation(violations) => {
                let mut res =
                    Resolution::new(StatusCode::BAD_REQUEST, "Validation failed", "BadRequestException")
                        .with_detail(format!("{} validation error(s)", violations.len()));
                res.errors = Some(violations.clone());
                res
            }
            ApiError::Store(store) => Resolution::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                FALLBACK_ERROR_NAME,
            )
            .with_detail(store.detail.clone()),
            ApiError::Internal(e) => Resolution::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                FALLBACK_ERROR_NAME,
            )
            .with_detail(format!("{e:#}")),
        }
    }
}

impl ExceptionFilter for HttpErrorFilter {
    fn catch(&self, err: &ApiError) -> Option<Resolution> {
        Some(Self::resolve(err))
    }
}

static STANDARD_CHAIN: [&dyn ExceptionFilter; 2] = [&StoreErrorFilter, &HttpErrorFilter];

/// Runs the standard chain: store filter, then the catch-all.
pub fn resolve(err: &ApiError) -> Resolution {
    STANDARD_CHAIN
        .iter()
        .find_map(|f| f.catch(err))
        .unwrap_or_else(|| HttpErrorFilter::resolve(err))
}

fn log_resolution(meta: &RequestMeta, res: &Resolution) {
    if res.status == StatusCode::NOT_FOUND {
        return;
    }
    if res.status.is_server_error() {
        tracing::error!(
            method = %meta.method,
            path = %meta.path,
            request_id = %meta.request_id,
            status = res.status.as_u16(),
            error_name = %res.error_name,
            detail = %res.detail,
            "request failed"
        );
    } else {
        tracing::warn!(
            method = %meta.method,
            path = %meta.path,
            request_id = %meta.request_id,
            status = res.status.as_u16(),
            error_name = %res.error_name,
            detail = %res.detail,
            "request rejected"
        );
    }
}

/// Copies headers set by inner layers (CORS, request id) except the body framing ones.
pub(crate) fn carry_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            to.append(name.clone(), value.clone());
        }
    }
}

pub async fn normalize_errors(req: Request<Body>, next: Next) -> Response {
    let meta = RequestMeta::from_request(&req);
    let res = next.run(req).await;

    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }

    let resolution = match res.extensions().get::<ErrorReport>() {
        Some(report) => resolve(report.error()),
        None => Resolution::from_status(status),
    };
    log_resolution(&meta, &resolution);

    let mut out = resolution.render(&meta).into_response();
    carry_headers(res.headers(), out.headers_mut());
    out
}
