use catalog_db::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Product with ID \"{id}\" not found")]
    ProductNotFound { id: Uuid },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn product_not_found(id: Uuid) -> Self {
        Self::ProductNotFound { id }
    }
}
