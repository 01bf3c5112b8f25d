use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{Product, ProductPage};

/// REST representation of a product. Amounts are plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub country: String,
    pub visa_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub length_of_stay: i32,
    pub entry_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub filing_fee: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for a page of products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPageDto {
    pub items: Vec<ProductDto>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            country: p.country,
            visa_type: p.visa_type,
            price: p.price,
            length_of_stay: p.length_of_stay,
            entry_type: p.entry_type,
            filing_fee: p.filing_fee,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProductPage> for ProductPageDto {
    fn from(page: ProductPage) -> Self {
        Self {
            items: page.items.into_iter().map(ProductDto::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages: page.pages,
        }
    }
}
