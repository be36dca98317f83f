//! Ratings left by renters. Creating one requires an authorized request
//! for the service, checked inside the insert's transaction. Editing and
//! deleting are author-only.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::rating;
use models::request::{self, Status};
use models::service;

use crate::errors::WorkflowError;
use crate::views::RatingWithService;

pub const RATING_NOT_FOUND: &str = "Rating not found.";

/// Score plus optional comment, as submitted.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub score: i16,
    pub comment: Option<String>,
}

#[instrument(skip(db, input), fields(service_id = %service_id, actor = %actor))]
pub async fn create_rating(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
    input: NewRating,
) -> Result<rating::Model, WorkflowError> {
    let txn = db.begin().await?;

    service::Entity::find_by_id(service_id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(crate::catalog::SERVICE_NOT_FOUND))?;

    let authorized = request::Entity::find()
        .filter(request::Column::ServiceId.eq(service_id))
        .filter(request::Column::RequesterId.eq(actor))
        .filter(request::Column::Status.eq(Status::Authorized.as_str()))
        .one(&txn)
        .await?
        .is_some();
    if !authorized {
        return Err(WorkflowError::forbidden(
            "You need an authorized request to rate this service.",
        ));
    }

    let created = rating::create(&txn, actor, service_id, input.score, input.comment).await?;
    txn.commit().await?;

    info!(rating_id = %created.id, score = created.score, "rating_created");
    Ok(created)
}

/// Overwrite score and comment. A missing comment clears the stored one.
#[instrument(skip(db, comment), fields(rating_id = %rating_id, actor = %actor))]
pub async fn update_rating(
    db: &DatabaseConnection,
    rating_id: Uuid,
    actor: Uuid,
    score: i16,
    comment: Option<String>,
) -> Result<rating::Model, WorkflowError> {
    let existing = rating::Entity::find_by_id(rating_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(RATING_NOT_FOUND))?;
    if existing.author_id != actor {
        return Err(WorkflowError::forbidden("You are not authorized to edit this rating."));
    }

    rating::validate_score(score)?;
    if let Some(text) = comment.as_deref() {
        rating::validate_comment(text)?;
    }

    let mut am: rating::ActiveModel = existing.into();
    am.score = Set(score);
    am.comment = Set(comment);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| WorkflowError::Db(e.to_string()))?;

    info!(rating_id = %updated.id, "rating_updated");
    Ok(updated)
}

#[instrument(skip(db), fields(rating_id = %rating_id, actor = %actor))]
pub async fn delete_rating(
    db: &DatabaseConnection,
    rating_id: Uuid,
    actor: Uuid,
) -> Result<(), WorkflowError> {
    let existing = rating::Entity::find_by_id(rating_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(RATING_NOT_FOUND))?;
    if existing.author_id != actor {
        return Err(WorkflowError::forbidden("You are not authorized to delete this rating."));
    }

    rating::Entity::delete_by_id(rating_id).exec(db).await?;
    info!(rating_id = %rating_id, "rating_deleted");
    Ok(())
}

/// Ratings the actor has written, newest first, each with its service.
pub async fn list_ratings_by_author(
    db: &DatabaseConnection,
    actor: Uuid,
) -> Result<Vec<RatingWithService>, WorkflowError> {
    let rows = rating::Entity::find()
        .filter(rating::Column::AuthorId.eq(actor))
        .order_by_desc(rating::Column::CreatedAt)
        .all(db)
        .await?;

    let service_ids: Vec<Uuid> = rows.iter().map(|r| r.service_id).collect();
    let services: std::collections::HashMap<Uuid, service::Model> = if service_ids.is_empty() {
        std::collections::HashMap::new()
    } else {
        service::Entity::find()
            .filter(service::Column::Id.is_in(service_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let svc = crate::views::required_row(&services, r.service_id, "service")?;
        out.push(RatingWithService { service: svc.clone(), rating: r });
    }
    Ok(out)
}
