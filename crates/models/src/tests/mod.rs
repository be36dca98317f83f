


use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory SQLite database with the full schema applied.
///
/// The pool is capped at one connection: every connection to
/// `sqlite::memory:` opens a separate database, so a second pooled
/// connection would see empty tables.
pub async fn fresh_db() -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Integration tests combining multiple entities
mod integration_tests {
    use super::fresh_db;
    use crate::{rating, request, service, user, user_credentials};
    use anyhow::Result;
    use sea_orm::EntityTrait;
    use uuid::Uuid;

    /// Full entity graph: user -> credentials -> service -> request -> rating
    #[tokio::test]
    async fn test_complete_entity_graph() -> Result<()> {
        let db = fresh_db().await?;

        // Create owner and requester accounts
        let owner = user::create(
            &db,
            user::NewUser {
                email: format!("owner_{}@example.com", Uuid::new_v4()),
                username: format!("owner_{}", &Uuid::new_v4().to_string()[..8]),
                ..Default::default()
            },
        )
        .await?;
        let requester = user::create(
            &db,
            user::NewUser {
                email: format!("requester_{}@example.com", Uuid::new_v4()),
                username: format!("req_{}", &Uuid::new_v4().to_string()[..8]),
                ..Default::default()
            },
        )
        .await?;

        let _creds =
            user_credentials::upsert_password(&db, owner.id, "hash".repeat(8), "argon2").await?;

        // Create service owned by owner
        let svc = service::create(&db, owner.id, "Kayak", "Two-seat kayak", "sports", 25.0, None)
            .await?;
        assert_eq!(svc.owner_id, owner.id);

        // Requester opens a pending request against the service
        let req = request::create_pending(&db, requester.id, svc.id).await?;
        assert_eq!(req.workflow_status(), Some(request::Status::Pending));
        assert_eq!(req.service_id, svc.id);

        // Rating referencing both
        let rt = rating::create(&db, requester.id, svc.id, 4, Some("solid".into())).await?;
        assert_eq!(rt.service_id, svc.id);
        assert_eq!(rt.author_id, requester.id);

        // Verify links resolve
        let found_req = request::Entity::find_by_id(req.id).one(&db).await?;
        assert!(found_req.is_some());
        let found_rating = rating::Entity::find_by_id(rt.id).one(&db).await?;
        assert!(found_rating.is_some());
        Ok(())
    }
}
