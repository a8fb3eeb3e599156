//! Migration: Create the participates join table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_auto_user_table::AutoUser;
use super::m20240101_000002_create_auto_post_table::AutoPost;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Participates::UserId).integer().not_null())
                    .col(ColumnDef::new(Participates::PostId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Participates::UserId)
                            .col(Participates::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participates_user_id")
                            .from(Participates::Table, Participates::UserId)
                            .to(AutoUser::Table, AutoUser::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participates_post_id")
                            .from(Participates::Table, Participates::PostId)
                            .to(AutoPost::Table, AutoPost::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Participates {
    Table,
    UserId,
    PostId,
}
