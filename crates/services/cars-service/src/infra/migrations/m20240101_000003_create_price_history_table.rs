//! Migration: Create the price_history table.
//!
//! The foreign key is restrictive: deleting a post removes its history
//! rows explicitly in the post repository.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_auto_post_table::AutoPost;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceHistory::Before).integer().not_null())
                    .col(ColumnDef::new(PriceHistory::After).integer().not_null())
                    .col(
                        ColumnDef::new(PriceHistory::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceHistory::AutoPostId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_history_auto_post_id")
                            .from(PriceHistory::Table, PriceHistory::AutoPostId)
                            .to(AutoPost::Table, AutoPost::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_history_auto_post_id")
                    .table(PriceHistory::Table)
                    .col(PriceHistory::AutoPostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PriceHistory {
    Table,
    Id,
    Before,
    After,
    Created,
    AutoPostId,
}
