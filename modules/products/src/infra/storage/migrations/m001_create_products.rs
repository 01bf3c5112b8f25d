use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Country,
    VisaType,
    Price,
    LengthOfStay,
    EntryType,
    FilingFee,
    CreatedAt,
    UpdatedAt,
}

const INDEXED: [(&str, Products); 5] = [
    ("idx_products_country", Products::Country),
    ("idx_products_visa_type", Products::VisaType),
    ("idx_products_price", Products::Price),
    ("idx_products_length_of_stay", Products::LengthOfStay),
    ("idx_products_entry_type", Products::EntryType),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Country).string().not_null())
                    .col(ColumnDef::new(Products::VisaType).string().not_null())
                    .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Products::LengthOfStay).integer().not_null())
                    .col(ColumnDef::new(Products::EntryType).string().not_null())
                    .col(ColumnDef::new(Products::FilingFee).decimal_len(10, 2).not_null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in INDEXED {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}
