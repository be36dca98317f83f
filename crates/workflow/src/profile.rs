//! Account profile reads and edits. Password changes live on
//! [`crate::auth::AuthService`] next to the hashing machinery.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::user;

use crate::errors::WorkflowError;

/// What the profile page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl ProfileView {
    fn from_user(u: &user::Model) -> Self {
        Self {
            username: u.username.clone(),
            email: u.email.clone(),
            phone_number: u.phone_number.clone(),
        }
    }
}

/// Optional replacements for the editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
}

async fn find_user(db: &DatabaseConnection, actor: Uuid) -> Result<user::Model, WorkflowError> {
    user::Entity::find_by_id(actor)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("User not found"))
}

pub async fn get_profile(db: &DatabaseConnection, actor: Uuid) -> Result<ProfileView, WorkflowError> {
    let u = find_user(db, actor).await?;
    Ok(ProfileView::from_user(&u))
}

/// Apply the provided subset. Email and username must stay unique; a
/// value already held by another account is a conflict.
#[instrument(skip(db, changes), fields(actor = %actor))]
pub async fn update_profile(
    db: &DatabaseConnection,
    actor: Uuid,
    changes: ProfileChanges,
) -> Result<ProfileView, WorkflowError> {
    let existing = find_user(db, actor).await?;

    let mut am: user::ActiveModel = existing.into();
    if let Some(email) = changes.email.as_deref() {
        user::validate_email(email)?;
        if let Some(other) = user::find_by_email(db, email).await? {
            if other.id != actor {
                return Err(WorkflowError::conflict(
                    "Email is already in use. Please use a different one.",
                ));
            }
        }
        am.email = Set(email.trim().to_string());
    }
    if let Some(username) = changes.username.as_deref() {
        user::validate_username(username)?;
        if let Some(other) = user::find_by_username(db, username).await? {
            if other.id != actor {
                return Err(WorkflowError::conflict(
                    "Username is already in use. Please use a different one.",
                ));
            }
        }
        am.username = Set(username.trim().to_string());
    }
    if let Some(phone) = changes.phone_number.as_deref() {
        user::validate_phone_number(phone)?;
        am.phone_number = Set(Some(phone.trim().to_string()));
    }
    am.updated_at = Set(Utc::now().into());

    let updated = am.update(db).await.map_err(|e| WorkflowError::Db(e.to_string()))?;
    info!(user_id = %updated.id, "profile_updated");
    Ok(ProfileView::from_user(&updated))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::test_support::{get_db, seed_user};

    #[tokio::test]
    async fn test_get_profile() -> Result<()> {
        let db = get_db().await?;
        let u = seed_user(&db, "casey").await?;

        let view = get_profile(&db, u.id).await?;
        assert_eq!(view.username, "casey");
        assert_eq!(view.email, "casey@example.com");
        assert_eq!(view.phone_number.as_deref(), Some("555-0100"));

        let err = get_profile(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_subset() -> Result<()> {
        let db = get_db().await?;
        let u = seed_user(&db, "drew").await?;

        let view = update_profile(
            &db,
            u.id,
            ProfileChanges { phone_number: Some("555-0199".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(view.phone_number.as_deref(), Some("555-0199"));
        assert_eq!(view.username, "drew");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_validates_formats() -> Result<()> {
        let db = get_db().await?;
        let u = seed_user(&db, "erin").await?;

        let err = update_profile(
            &db,
            u.id,
            ProfileChanges { email: Some("not an email".into()), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let err = update_profile(
            &db,
            u.id,
            ProfileChanges { username: Some("ab".into()), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_uniqueness_conflicts() -> Result<()> {
        let db = get_db().await?;
        let holder = seed_user(&db, "holder").await?;
        let mover = seed_user(&db, "mover").await?;

        let err = update_profile(
            &db,
            mover.id,
            ProfileChanges { email: Some(holder.email.clone()), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        let err = update_profile(
            &db,
            mover.id,
            ProfileChanges { username: Some("holder".into()), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        // keeping your own values is not a conflict
        let view = update_profile(
            &db,
            mover.id,
            ProfileChanges {
                email: Some(mover.email.clone()),
                username: Some("mover".into()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(view.username, "mover");
        Ok(())
    }
}
