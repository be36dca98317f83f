//! Create `service` table with FK to `user`.
//!
//! A listing offered for rent; owned by exactly one user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::OwnerId).not_null())
                    .col(string_len(Service::Title, 120).not_null())
                    .col(string_len(Service::Description, 2000).not_null())
                    .col(string_len(Service::ServiceType, 64).not_null())
                    .col(double(Service::PricePerDay).not_null())
                    .col(ColumnDef::new(Service::ImageUrl).string_len(512).null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_owner")
                            .from(Service::Table, Service::OwnerId)
                            .to(User::Table, User::Id)
                            // Cleanup of dependents is owned by the workflow layer,
                            // so the schema only guards referential integrity.
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    ServiceType,
    PricePerDay,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
