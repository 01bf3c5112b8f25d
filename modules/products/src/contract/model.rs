use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Pure product model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub country: String,
    pub visa_type: String,
    pub price: Decimal,
    /// Days.
    pub length_of_stay: i32,
    pub entry_type: String,
    pub filing_fee: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub country: String,
    pub visa_type: String,
    pub price: Decimal,
    pub length_of_stay: i32,
    pub entry_type: String,
    pub filing_fee: Decimal,
}

/// Partial update data for a product
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPatch {
    pub country: Option<String>,
    pub visa_type: Option<String>,
    pub price: Option<Decimal>,
    pub length_of_stay: Option<i32>,
    pub entry_type: Option<String>,
    pub filing_fee: Option<Decimal>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One page of a filtered listing. `total` ignores paging but honors filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}
