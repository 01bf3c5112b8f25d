use async_trait::async_trait;
use catalog_db::query::PageRequest;
use catalog_db::StoreError;
use uuid::Uuid;

use crate::contract::model::Product;
use crate::domain::query::{Predicate, Sort};

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Insert a fully-formed product and return the stored row.
    ///
    /// Service computes id/timestamps/rounding; repo persists.
    async fn insert(&self, p: Product) -> Result<Product, StoreError>;
    /// Load a product by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    /// One page of matching products in the requested order.
    async fn find_many(
        &self,
        predicate: &Predicate,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<Product>, StoreError>;
    /// Number of matching products, ignoring paging.
    async fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError>;
    /// Overwrite an existing product (by primary key in `p.id`) and return the stored row.
    async fn update(&self, p: Product) -> Result<Product, StoreError>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
