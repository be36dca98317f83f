use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: index on owner_id for the "my listings" view
        manager
            .create_index(
                Index::create()
                    .name("idx_service_owner")
                    .table(Service::Table)
                    .col(Service::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Request: index on requester_id for the "my requests" view
        manager
            .create_index(
                Index::create()
                    .name("idx_request_requester")
                    .table(Request::Table)
                    .col(Request::RequesterId)
                    .to_owned(),
            )
            .await?;

        // Request: composite (service_id, status) for inbox and duplicate-pending checks
        manager
            .create_index(
                Index::create()
                    .name("idx_request_service_status")
                    .table(Request::Table)
                    .col(Request::ServiceId)
                    .col(Request::Status)
                    .to_owned(),
            )
            .await?;

        // Rating: index on service_id for detail pages
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_service")
                    .table(Rating::Table)
                    .col(Rating::ServiceId)
                    .to_owned(),
            )
            .await?;

        // Rating: index on author_id for the "my ratings" view
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_author")
                    .table(Rating::Table)
                    .col(Rating::AuthorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_owner").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_request_requester").table(Request::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_request_service_status")
                    .table(Request::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_rating_service").table(Rating::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_rating_author").table(Rating::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Service { Table, OwnerId }

#[derive(DeriveIden)]
enum Request { Table, RequesterId, ServiceId, Status }

#[derive(DeriveIden)]
enum Rating { Table, ServiceId, AuthorId }
