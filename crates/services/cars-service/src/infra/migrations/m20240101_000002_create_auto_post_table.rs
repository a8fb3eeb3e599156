//! Migration: Create the auto_post table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_auto_user_table::AutoUser;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AutoPost::Table)
                    .if_not_exists()
                    // Ids are chosen by the caller, no sequence
                    .col(
                        ColumnDef::new(AutoPost::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AutoPost::Description).text().not_null())
                    .col(
                        ColumnDef::new(AutoPost::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AutoPost::AutoUserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auto_post_auto_user_id")
                            .from(AutoPost::Table, AutoPost::AutoUserId)
                            .to(AutoUser::Table, AutoUser::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auto_post_auto_user_id")
                    .table(AutoPost::Table)
                    .col(AutoPost::AutoUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AutoPost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum AutoPost {
    Table,
    Id,
    Description,
    Created,
    AutoUserId,
}
