use apikit::ApiError;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

/// The `{id}` path segment, required to be a hyphenated UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub Uuid);

pub const INVALID_UUID_MESSAGE: &str = "Validation failed (uuid is expected)";

pub fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.len() != 36 {
        return Err(ApiError::bad_request(INVALID_UUID_MESSAGE));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(INVALID_UUID_MESSAGE))
}

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(INVALID_UUID_MESSAGE))?;
        parse_product_id(&raw).map(ProductId)
    }
}
