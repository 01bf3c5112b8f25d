//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be built on a
//! `DatabaseConnection` or on a transaction.

use catalog_db::query::{contains_ci, range_condition, PageRequest, SelectPageExt};
use catalog_db::StoreError;
use sea_orm::{ActiveModelTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::contract::model::Product;
use crate::domain::query::{Clause, Predicate, Sort, SortField, TextField};
use crate::domain::repo::ProductsRepository;
use crate::infra::storage::entity::{ActiveModel as ProductAM, Column, Entity as ProductEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn text_column(field: TextField) -> Column {
    match field {
        TextField::Country => Column::Country,
        TextField::VisaType => Column::VisaType,
        TextField::EntryType => Column::EntryType,
    }
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Country => Column::Country,
        SortField::VisaType => Column::VisaType,
        SortField::Price => Column::Price,
        SortField::LengthOfStay => Column::LengthOfStay,
        SortField::EntryType => Column::EntryType,
        SortField::FilingFee => Column::FilingFee,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
    }
}

/// ANDs every clause of the predicate.
pub fn to_condition(predicate: &Predicate) -> Condition {
    predicate
        .clauses()
        .iter()
        .fold(Condition::all(), |cond, clause| {
            let part = match clause {
                Clause::Contains { field, needle } => contains_ci(text_column(*field), needle),
                Clause::Price(bound) => range_condition(Column::Price, bound.clone()),
                Clause::LengthOfStay(bound) => range_condition(Column::LengthOfStay, bound.clone()),
            };
            cond.add(part)
        })
}

#[async_trait::async_trait]
impl<C> ProductsRepository for SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, p: Product) -> Result<Product, StoreError> {
        let m: ProductAM = p.into();
        let stored = m.insert(&self.conn).await?;
        Ok(stored.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let found = ProductEntity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn find_many(
        &self,
        predicate: &Predicate,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = ProductEntity::find()
            .filter(to_condition(predicate))
            .sorted_by(sort_column(sort.field), sort.dir)
            .paged(page)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let total = ProductEntity::find()
            .filter(to_condition(predicate))
            .count(&self.conn)
            .await?;
        Ok(total)
    }

    async fn update(&self, p: Product) -> Result<Product, StoreError> {
        let m: ProductAM = p.into();
        let stored = m.update(&self.conn).await?;
        Ok(stored.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = ProductEntity::delete_by_id(id).exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }
}
