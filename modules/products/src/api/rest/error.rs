use apikit::ApiError;

use crate::domain::error::DomainError;

/// Domain failures become HTTP exceptions; store failures stay classified so
/// the error filter chain can map them.
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ProductNotFound { .. } => ApiError::not_found(e.to_string()),
            DomainError::Store(store) => ApiError::Store(store),
        }
    }
}
