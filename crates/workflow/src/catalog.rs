//! Service catalog operations: create, list, detail, update and the
//! cascading delete. Mutations check ownership before touching anything;
//! the cascade runs inside a single transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{rating, request, service, user};

use crate::errors::WorkflowError;
use crate::views::{
    load_users, required_row, OwnerView, RatingWithAuthor, ServiceDetail, ServiceWithOwner,
    UserPublic,
};

pub const SERVICE_NOT_FOUND: &str = "This service cannot be found.";

/// Fields accepted when listing a new service.
#[derive(Debug, Clone)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub price_per_day: f64,
    pub image_url: Option<String>,
}

/// Optional replacements for an existing service. Absent fields keep
/// their stored value; the type is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_day: Option<f64>,
    pub image_url: Option<String>,
}

async fn find_service<C: sea_orm::ConnectionTrait>(
    db: &C,
    service_id: Uuid,
) -> Result<service::Model, WorkflowError> {
    service::Entity::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(SERVICE_NOT_FOUND))
}

#[instrument(skip(db, input), fields(owner = %owner))]
pub async fn create_service(
    db: &DatabaseConnection,
    owner: Uuid,
    input: NewService,
) -> Result<service::Model, WorkflowError> {
    let created = service::create(
        db,
        owner,
        &input.title,
        &input.description,
        &input.service_type,
        input.price_per_day,
        input.image_url,
    )
    .await?;
    info!(service_id = %created.id, "service_created");
    Ok(created)
}

/// Every service in the catalog, each with its owner's public fields.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<ServiceWithOwner>, WorkflowError> {
    let services = service::Entity::find().all(db).await?;
    let owners = load_users(db, services.iter().map(|s| s.owner_id)).await?;

    let mut out = Vec::with_capacity(services.len());
    for s in services {
        let owner = required_row(&owners, s.owner_id, "user")?;
        out.push(ServiceWithOwner { owner: UserPublic::from_user(owner), service: s });
    }
    Ok(out)
}

/// The actor's own listings, plain rows.
pub async fn list_services_by_owner(
    db: &DatabaseConnection,
    owner: Uuid,
) -> Result<Vec<service::Model>, WorkflowError> {
    Ok(service::Entity::find()
        .filter(service::Column::OwnerId.eq(owner))
        .all(db)
        .await?)
}

/// Detail page payload: the service, its ratings newest first with their
/// authors, the actor's own request against it (latest, any status), and
/// the owner. Owner contact fields appear only for the owner themselves
/// and for actors holding an authorized request.
pub async fn get_service_detail(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
) -> Result<ServiceDetail, WorkflowError> {
    let svc = find_service(db, service_id).await?;

    let ratings = rating::Entity::find()
        .filter(rating::Column::ServiceId.eq(service_id))
        .order_by_desc(rating::Column::CreatedAt)
        .all(db)
        .await?;
    let authors = load_users(db, ratings.iter().map(|r| r.author_id)).await?;
    let mut rating_views = Vec::with_capacity(ratings.len());
    for r in ratings {
        let author = required_row(&authors, r.author_id, "user")?;
        rating_views.push(RatingWithAuthor { author: UserPublic::from_user(author), rating: r });
    }

    let own_requests = request::Entity::find()
        .filter(request::Column::ServiceId.eq(service_id))
        .filter(request::Column::RequesterId.eq(actor))
        .order_by_desc(request::Column::CreatedAt)
        .all(db)
        .await?;
    let authorized = own_requests
        .iter()
        .any(|r| r.workflow_status() == Some(request::Status::Authorized));
    let own_request = own_requests.into_iter().next();

    let owner_row = user::Entity::find_by_id(svc.owner_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::Db(format!("user {} referenced but missing", svc.owner_id)))?;
    let owner = if actor == svc.owner_id || authorized {
        OwnerView::with_contact(&owner_row)
    } else {
        OwnerView::public(&owner_row)
    };

    Ok(ServiceDetail { service: svc, owner, ratings: rating_views, request: own_request })
}

#[instrument(skip(db, changes), fields(service_id = %service_id, actor = %actor))]
pub async fn update_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
    changes: ServiceChanges,
) -> Result<service::Model, WorkflowError> {
    let existing = find_service(db, service_id).await?;
    if existing.owner_id != actor {
        return Err(WorkflowError::forbidden(
            "Unable to update. You are not the owner of this service.",
        ));
    }

    let mut am: service::ActiveModel = existing.into();
    if let Some(title) = changes.title.as_deref() {
        service::validate_title(title)?;
        am.title = Set(title.trim().to_string());
    }
    if let Some(description) = changes.description.as_deref() {
        service::validate_description(description)?;
        am.description = Set(description.trim().to_string());
    }
    if let Some(price) = changes.price_per_day {
        service::validate_price_per_day(price)?;
        am.price_per_day = Set(price);
    }
    if let Some(url) = changes.image_url {
        am.image_url = Set(Some(url));
    }
    am.updated_at = Set(Utc::now().into());

    let updated = am.update(db).await.map_err(|e| WorkflowError::Db(e.to_string()))?;
    info!(service_id = %updated.id, "service_updated");
    Ok(updated)
}

/// Remove a service and everything hanging off it. Requests and ratings
/// go first, then the row itself, all under one transaction so a failure
/// partway leaves the catalog untouched.
#[instrument(skip(db), fields(service_id = %service_id, actor = %actor))]
pub async fn delete_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
) -> Result<(), WorkflowError> {
    let svc = find_service(db, service_id).await?;
    if svc.owner_id != actor {
        return Err(WorkflowError::forbidden(
            "Unable to delete. You are not the owner of this service.",
        ));
    }

    let txn = db.begin().await?;
    let requests = request::Entity::delete_many()
        .filter(request::Column::ServiceId.eq(service_id))
        .exec(&txn)
        .await?;
    let ratings = rating::Entity::delete_many()
        .filter(rating::Column::ServiceId.eq(service_id))
        .exec(&txn)
        .await?;
    service::Entity::delete_by_id(service_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        service_id = %service_id,
        requests_removed = requests.rows_affected,
        ratings_removed = ratings.rows_affected,
        "service_deleted"
    );
    Ok(())
}
