#![cfg(test)]
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// Fresh in-memory database with the full schema applied.
///
/// Capped at one connection: every pooled connection to `sqlite::memory:`
/// opens its own empty database, so a larger pool would hand tests blank
/// schemas.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn seed_user(db: &DatabaseConnection, username: &str) -> Result<models::user::Model, anyhow::Error> {
    let input = models::user::NewUser {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        phone_number: Some("555-0100".into()),
        ..Default::default()
    };
    Ok(models::user::create(db, input).await?)
}

pub async fn seed_service(db: &DatabaseConnection, owner_id: Uuid) -> Result<models::service::Model, anyhow::Error> {
    Ok(models::service::create(
        db,
        owner_id,
        "Pressure washer",
        "A sturdy washer for driveways and patios.",
        "tools",
        25.0,
        None,
    )
    .await?)
}
