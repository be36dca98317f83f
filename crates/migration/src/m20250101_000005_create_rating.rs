//! Create `rating` table with FKs to `user` and `service`.
//!
//! Feedback left by a requester whose rental was authorized.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(uuid(Rating::Id).primary_key())
                    .col(uuid(Rating::AuthorId).not_null())
                    .col(uuid(Rating::ServiceId).not_null())
                    .col(small_integer(Rating::Score).not_null())
                    .col(ColumnDef::new(Rating::Comment).string_len(500).null())
                    .col(timestamp_with_time_zone(Rating::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Rating::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_author")
                            .from(Rating::Table, Rating::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_service")
                            .from(Rating::Table, Rating::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    Id,
    AuthorId,
    ServiceId,
    Score,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
