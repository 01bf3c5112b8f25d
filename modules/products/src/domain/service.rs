use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{NewProduct, Product, ProductPage, ProductPatch};
use crate::domain::error::DomainError;
use crate::domain::query::{build_plan, ProductQuery};
use crate::domain::repo::ProductsRepository;

/// Domain service with the catalog rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ProductsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: ProductQuery::DEFAULT_LIMIT,
        }
    }
}

/// Amounts are stored with two decimals.
pub fn round_amount(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Storage keeps microseconds, so timestamps are truncated before saving.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn ProductsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn default_page_size(&self) -> u64 {
        self.config.default_page_size
    }

    #[instrument(
        name = "products.service.create",
        skip(self, new_product),
        fields(country = %new_product.country, visa_type = %new_product.visa_type)
    )]
    pub async fn create(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        info!("Creating new product");

        let ts = now();
        let product = Product {
            id: Uuid::new_v4(),
            country: new_product.country,
            visa_type: new_product.visa_type,
            price: round_amount(new_product.price),
            length_of_stay: new_product.length_of_stay,
            entry_type: new_product.entry_type,
            filing_fee: round_amount(new_product.filing_fee),
            created_at: ts,
            updated_at: ts,
        };
        let created = self.repo.insert(product).await?;

        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    #[instrument(name = "products.service.find_one", skip(self), fields(product_id = %id))]
    pub async fn find_one(&self, id: Uuid) -> Result<Product, DomainError> {
        debug!("Finding product by id");

        match self.repo.find_by_id(id).await? {
            Some(p) => Ok(p),
            None => {
                warn!("Product not found");
                Err(DomainError::product_not_found(id))
            }
        }
    }

    #[instrument(
        name = "products.service.find_many",
        skip(self, query),
        fields(page = query.page, limit = query.limit, sort_by = query.sort_by.as_str())
    )]
    pub async fn find_many(&self, query: ProductQuery) -> Result<ProductPage, DomainError> {
        debug!(?query, "Finding products");

        let plan = build_plan(&query);
        let items = self
            .repo
            .find_many(&plan.predicate, plan.sort, plan.page)
            .await?;
        let total = self.repo.count_matching(&plan.predicate).await?;

        debug!(count = items.len(), total, "Found products");
        Ok(ProductPage {
            items,
            total,
            page: plan.page.page,
            limit: plan.page.limit,
            pages: plan.page.pages(total),
        })
    }

    #[instrument(name = "products.service.update", skip(self, patch), fields(product_id = %id))]
    pub async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product, DomainError> {
        info!("Updating product");

        let mut current = self.find_one(id).await?;
        if patch.is_empty() {
            debug!("Empty patch, nothing to store");
            return Ok(current);
        }

        if let Some(country) = patch.country {
            current.country = country;
        }
        if let Some(visa_type) = patch.visa_type {
            current.visa_type = visa_type;
        }
        if let Some(price) = patch.price {
            current.price = round_amount(price);
        }
        if let Some(length_of_stay) = patch.length_of_stay {
            current.length_of_stay = length_of_stay;
        }
        if let Some(entry_type) = patch.entry_type {
            current.entry_type = entry_type;
        }
        if let Some(filing_fee) = patch.filing_fee {
            current.filing_fee = round_amount(filing_fee);
        }
        current.updated_at = now();

        let updated = self.repo.update(current).await?;

        debug!("Product updated");
        Ok(updated)
    }

    #[instrument(name = "products.service.remove", skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Removing product");

        self.find_one(id).await?;
        if !self.repo.delete(id).await? {
            return Err(DomainError::product_not_found(id));
        }

        debug!("Product removed");
        Ok(())
    }
}
