//! Create `request` table with FKs to `user` and `service`.
//!
//! A rental request; `status` holds one of pending/authorized/denied.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Request::Table)
                    .if_not_exists()
                    .col(uuid(Request::Id).primary_key())
                    .col(uuid(Request::RequesterId).not_null())
                    .col(uuid(Request::ServiceId).not_null())
                    .col(string_len(Request::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Request::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Request::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_requester")
                            .from(Request::Table, Request::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_service")
                            .from(Request::Table, Request::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Request::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Request {
    Table,
    Id,
    RequesterId,
    ServiceId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
