use sea_orm::Set;

use crate::contract::model::Product;
use crate::domain::service::round_amount;
use crate::infra::storage::entity::{ActiveModel, Model};

/// Entity -> contract. Amounts are re-rounded because engines without a
/// native decimal type hand them back as floats.
impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            country: m.country,
            visa_type: m.visa_type,
            price: round_amount(m.price),
            length_of_stay: m.length_of_stay,
            entry_type: m.entry_type,
            filing_fee: round_amount(m.filing_fee),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Contract -> fully-set active model.
impl From<Product> for ActiveModel {
    fn from(p: Product) -> Self {
        Self {
            id: Set(p.id),
            country: Set(p.country),
            visa_type: Set(p.visa_type),
            price: Set(p.price),
            length_of_stay: Set(p.length_of_stay),
            entry_type: Set(p.entry_type),
            filing_fee: Set(p.filing_fee),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}
