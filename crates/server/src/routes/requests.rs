use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use models::request;
use workflow::requests;
use workflow::views::{RequestDetail, RequestWithRequester, RequestWithService};

use crate::errors::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::routes::auth::ServerState;

/// `status` stays optional so a body without one reports "Status is
/// missing." instead of a deserialization error.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

#[utoipa::path(post, path = "/requests/{id}", tag = "requests",
    params(("id" = Uuid, Path, description = "Service id to request")),
    responses(
        (status = 201, description = "Pending request opened"),
        (status = 403, description = "Caller owns this service"),
        (status = 404, description = "No such service"),
        (status = 409, description = "A pending request already exists")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(service_id): Path<Uuid>,
) -> Result<(StatusCode, Json<request::Model>), ApiError> {
    let created = requests::create_request(&state.db, service_id, actor).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/requests/user", tag = "requests",
    responses((status = 200, description = "The caller's requests, newest first")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<RequestWithService>>, ApiError> {
    let rows = requests::list_for_user(&state.db, actor).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/requests/service/{id}", tag = "requests",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Requests received for this service"),
        (status = 403, description = "Caller does not own this service"),
        (status = 404, description = "No such service")
    ))]
pub async fn list_for_service(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Vec<RequestWithRequester>>, ApiError> {
    let rows = requests::list_for_service(&state.db, service_id, actor).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/requests/{id}", tag = "requests",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request with requester and service"),
        (status = 403, description = "Caller is neither requester nor owner"),
        (status = 404, description = "No such request")
    ))]
pub async fn detail(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestDetail>, ApiError> {
    let found = requests::get_request(&state.db, id, actor).await?;
    Ok(Json(found))
}

#[utoipa::path(put, path = "/requests/{id}", tag = "requests",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Request resolved"),
        (status = 400, description = "Missing or unknown status"),
        (status = 403, description = "Caller does not own the service"),
        (status = 404, description = "No such request"),
        (status = 409, description = "Request already handled")
    ))]
pub async fn update_status(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<UpdateStatusBody>,
) -> Result<Json<request::Model>, ApiError> {
    let updated =
        requests::update_status(&state.db, id, actor, body.status.as_deref()).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/requests/{id}", tag = "requests",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request withdrawn; returns the removed row"),
        (status = 403, description = "Caller is not the requester"),
        (status = 404, description = "No such request")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<request::Model>, ApiError> {
    let removed = requests::delete_request(&state.db, id, actor).await?;
    Ok(Json(removed))
}
