//! Shared HTTP contract: the error taxonomy handlers return, the JSON
//! envelopes clients receive, and the per-request context the middleware
//! pipeline attaches.

pub mod context;
pub mod envelope;
pub mod error;

pub use context::{RequestMeta, XRequestId, REQUEST_ID_HEADER};
pub use envelope::{json_response, timestamp_now, ErrorResponse, SuccessEnvelope};
pub use error::{exception_name, ApiError, ErrorReport, FieldViolation};
