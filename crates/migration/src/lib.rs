//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user;
mod m20250101_000002_create_user_credentials;
mod m20250101_000003_create_service;
mod m20250101_000004_create_request;
mod m20250101_000005_create_rating;
mod m20250101_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user::Migration),
            Box::new(m20250101_000002_create_user_credentials::Migration),
            Box::new(m20250101_000003_create_service::Migration),
            Box::new(m20250101_000004_create_request::Migration),
            Box::new(m20250101_000005_create_rating::Migration),
            // Indexes should always be applied last
            Box::new(m20250101_000006_add_indexes::Migration),
        ]
    }
}
