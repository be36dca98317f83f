//! Rental request workflow. Requests are born `pending`; the service
//! owner moves them to `authorized` or `denied` exactly once. Every
//! check-then-write sequence runs under one transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::request::{self, Status};
use models::service;

use crate::errors::WorkflowError;
use crate::views::{
    load_users, required_row, RequestDetail, RequestWithRequester, RequestWithService,
    ServiceWithOwner, UserPublic,
};

pub const REQUEST_NOT_FOUND: &str = "This request cannot be found.";

/// Open a pending request against a service. Owners cannot request their
/// own listing, and a second pending request for the same pair is
/// rejected; both checks share the insert's transaction.
#[instrument(skip(db), fields(service_id = %service_id, actor = %actor))]
pub async fn create_request(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
) -> Result<request::Model, WorkflowError> {
    let txn = db.begin().await?;

    let svc = service::Entity::find_by_id(service_id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(crate::catalog::SERVICE_NOT_FOUND))?;
    if svc.owner_id == actor {
        return Err(WorkflowError::forbidden("You cannot request your own service."));
    }

    let pending = request::Entity::find()
        .filter(request::Column::ServiceId.eq(service_id))
        .filter(request::Column::RequesterId.eq(actor))
        .filter(request::Column::Status.eq(Status::Pending.as_str()))
        .one(&txn)
        .await?;
    if pending.is_some() {
        return Err(WorkflowError::conflict(
            "You already have a pending request for this service.",
        ));
    }

    let created = request::create_pending(&txn, actor, service_id).await?;
    txn.commit().await?;

    info!(request_id = %created.id, "request_created");
    Ok(created)
}

/// Requests received for one service, owner only, each with the
/// requester's public fields.
pub async fn list_for_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    actor: Uuid,
) -> Result<Vec<RequestWithRequester>, WorkflowError> {
    let svc = service::Entity::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(crate::catalog::SERVICE_NOT_FOUND))?;
    if svc.owner_id != actor {
        return Err(WorkflowError::forbidden("You are not the owner of this service."));
    }

    let rows = request::Entity::find()
        .filter(request::Column::ServiceId.eq(service_id))
        .all(db)
        .await?;
    let requesters = load_users(db, rows.iter().map(|r| r.requester_id)).await?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let requester = required_row(&requesters, r.requester_id, "user")?;
        out.push(RequestWithRequester {
            requester: UserPublic::from_user(requester),
            request: r,
        });
    }
    Ok(out)
}

/// The actor's own requests, most recent first, each carrying the
/// service it targets and that service's owner.
pub async fn list_for_user(
    db: &DatabaseConnection,
    actor: Uuid,
) -> Result<Vec<RequestWithService>, WorkflowError> {
    let rows = request::Entity::find()
        .filter(request::Column::RequesterId.eq(actor))
        .order_by_desc(request::Column::CreatedAt)
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
    let owners = load_users(db, services.values().map(|s| s.owner_id)).await?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let svc = required_row(&services, r.service_id, "service")?;
        let owner = required_row(&owners, svc.owner_id, "user")?;
        out.push(RequestWithService {
            request: r,
            service: ServiceWithOwner {
                service: svc.clone(),
                owner: UserPublic::from_user(owner),
            },
        });
    }
    Ok(out)
}

/// One request in full, visible to its requester and to the owner of the
/// service it targets.
pub async fn get_request(
    db: &DatabaseConnection,
    request_id: Uuid,
    actor: Uuid,
) -> Result<RequestDetail, WorkflowError> {
    let req = request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(REQUEST_NOT_FOUND))?;
    let svc = service::Entity::find_by_id(req.service_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::Db(format!("service {} referenced but missing", req.service_id)))?;

    if req.requester_id != actor && svc.owner_id != actor {
        return Err(WorkflowError::forbidden("You are not allowed to see this request."));
    }

    let people = load_users(db, [req.requester_id, svc.owner_id]).await?;
    let requester = required_row(&people, req.requester_id, "user")?;
    let owner = required_row(&people, svc.owner_id, "user")?;

    Ok(RequestDetail {
        requester: UserPublic::from_user(requester),
        service: ServiceWithOwner { owner: UserPublic::from_user(owner), service: svc },
        request: req,
    })
}

/// Resolve a pending request. Only `authorized` and `denied` are valid
/// targets, only the service owner may decide, and a request that has
/// already been decided stays decided.
#[instrument(skip(db), fields(request_id = %request_id, actor = %actor))]
pub async fn update_status(
    db: &DatabaseConnection,
    request_id: Uuid,
    actor: Uuid,
    new_status: Option<&str>,
) -> Result<request::Model, WorkflowError> {
    let Some(raw) = new_status else {
        return Err(WorkflowError::validation("Status is missing."));
    };
    let target = match Status::parse(raw) {
        Some(s) if s.is_terminal() => s,
        _ => {
            return Err(WorkflowError::validation(
                "Status must be either authorized or denied.",
            ))
        }
    };

    let txn = db.begin().await?;

    let req = request::Entity::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(REQUEST_NOT_FOUND))?;
    let svc = service::Entity::find_by_id(req.service_id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::Db(format!("service {} referenced but missing", req.service_id)))?;
    if svc.owner_id != actor {
        return Err(WorkflowError::forbidden(
            "Unable to update. You are not the owner of this request.",
        ));
    }
    match req.workflow_status() {
        Some(Status::Pending) => {}
        Some(_) => return Err(WorkflowError::conflict("This request has already been handled.")),
        None => return Err(WorkflowError::Db(format!("request {} holds unknown status", req.id))),
    }

    let mut am: request::ActiveModel = req.into();
    am.status = Set(target.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await.map_err(|e| WorkflowError::Db(e.to_string()))?;
    txn.commit().await?;

    info!(request_id = %updated.id, status = %target, "request_resolved");
    Ok(updated)
}

/// Withdraw a request. Only the requester may do so; the status does not
/// matter. Returns the removed row.
#[instrument(skip(db), fields(request_id = %request_id, actor = %actor))]
pub async fn delete_request(
    db: &DatabaseConnection,
    request_id: Uuid,
    actor: Uuid,
) -> Result<request::Model, WorkflowError> {
    let req = request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(REQUEST_NOT_FOUND))?;
    if req.requester_id != actor {
        return Err(WorkflowError::forbidden(
            "Unable to delete. You are not the owner of this request.",
        ));
    }

    request::Entity::delete_by_id(request_id).exec(db).await?;
    info!(request_id = %request_id, "request_withdrawn");
    Ok(req)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::test_support::{get_db, seed_service, seed_user};

    #[tokio::test]
    async fn test_create_request_happy_path() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;

        let req = create_request(&db, svc.id, renter.id).await?;
        assert_eq!(req.status, "pending");
        assert_eq!(req.requester_id, renter.id);
        assert_eq!(req.service_id, svc.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_request_missing_service() -> Result<()> {
        let db = get_db().await?;
        let renter = seed_user(&db, "renter").await?;

        let err = create_request(&db, Uuid::new_v4(), renter.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_owner_cannot_request_own_service() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let svc = seed_service(&db, owner.id).await?;

        let err = create_request(&db, svc.id, owner.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let rows = request::Entity::find().all(&db).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_pending_is_conflict() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;

        create_request(&db, svc.id, renter.id).await?;
        let err = create_request(&db, svc.id, renter.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        let rows = request::Entity::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_pending_allowed_after_resolution() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;

        let first = create_request(&db, svc.id, renter.id).await?;
        update_status(&db, first.id, owner.id, Some("denied")).await?;

        // the earlier request is settled, so a fresh pending one is fine
        let second = create_request(&db, svc.id, renter.id).await?;
        assert_eq!(second.status, "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_service_owner_only() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        create_request(&db, svc.id, renter.id).await?;

        let rows = list_for_service(&db, svc.id, owner.id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].requester.username, "renter");

        let err = list_for_service(&db, svc.id, renter.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let err = list_for_service(&db, Uuid::new_v4(), owner.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_user_attaches_service_and_owner() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let first = seed_service(&db, owner.id).await?;
        let second = seed_service(&db, owner.id).await?;

        create_request(&db, first.id, renter.id).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        create_request(&db, second.id, renter.id).await?;

        let rows = list_for_user(&db, renter.id).await?;
        assert_eq!(rows.len(), 2);
        // newest first
        assert_eq!(rows[0].service.service.id, second.id);
        assert_eq!(rows[1].service.service.id, first.id);
        assert_eq!(rows[0].service.owner.username, "owner");

        // the owner has asked for nothing
        assert!(list_for_user(&db, owner.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_request_visibility() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let stranger = seed_user(&db, "stranger").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        // requester sees it
        let detail = get_request(&db, req.id, renter.id).await?;
        assert_eq!(detail.request.id, req.id);
        assert_eq!(detail.requester.username, "renter");
        assert_eq!(detail.service.owner.username, "owner");

        // the service owner sees it too
        assert!(get_request(&db, req.id, owner.id).await.is_ok());

        // anyone else does not
        let err = get_request(&db, req.id, stranger.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let err = get_request(&db, Uuid::new_v4(), renter.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_happy_path() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        let updated = update_status(&db, req.id, owner.id, Some("authorized")).await?;
        assert_eq!(updated.status, "authorized");
        assert!(updated.updated_at >= req.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_rejects_bad_literals() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        let err = update_status(&db, req.id, owner.id, None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        // pending is not a target, nor is anything outside the enum
        for bad in ["pending", "accepted", "AUTHORIZED", ""] {
            let err = update_status(&db, req.id, owner.id, Some(bad)).await.unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "literal {bad:?}");
        }

        let stored = request::Entity::find_by_id(req.id).one(&db).await?.expect("row");
        assert_eq!(stored.status, "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_owner_only() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        // the requester cannot settle their own request
        let err = update_status(&db, req.id, renter.id, Some("authorized")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let stored = request::Entity::find_by_id(req.id).one(&db).await?.expect("row");
        assert_eq!(stored.status, "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_terminal_is_conflict() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        update_status(&db, req.id, owner.id, Some("denied")).await?;

        for retry in ["authorized", "denied"] {
            let err = update_status(&db, req.id, owner.id, Some(retry)).await.unwrap_err();
            assert!(matches!(err, WorkflowError::Conflict(_)), "target {retry:?}");
        }

        let stored = request::Entity::find_by_id(req.id).one(&db).await?.expect("row");
        assert_eq!(stored.status, "denied");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_missing_request() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;

        let err = update_status(&db, Uuid::new_v4(), owner.id, Some("authorized")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_request_requester_only() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;
        let req = create_request(&db, svc.id, renter.id).await?;

        // even the service owner cannot withdraw it
        let err = delete_request(&db, req.id, owner.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let removed = delete_request(&db, req.id, renter.id).await?;
        assert_eq!(removed.id, req.id);
        assert!(request::Entity::find_by_id(req.id).one(&db).await?.is_none());

        let err = delete_request(&db, req.id, renter.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_request_any_status() -> Result<()> {
        let db = get_db().await?;
        let owner = seed_user(&db, "owner").await?;
        let renter = seed_user(&db, "renter").await?;
        let svc = seed_service(&db, owner.id).await?;

        let req = create_request(&db, svc.id, renter.id).await?;
        update_status(&db, req.id, owner.id, Some("authorized")).await?;
        delete_request(&db, req.id, renter.id).await?;
        assert!(request::Entity::find_by_id(req.id).one(&db).await?.is_none());
        Ok(())
    }
}
