use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use models::service;
use workflow::catalog::{self, NewService, ServiceChanges};
use workflow::views::{ServiceDetail, ServiceWithOwner};

use crate::errors::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::routes::auth::ServerState;
use crate::routes::MessageResponse;

// Absent strings default to empty and absent prices to NaN, so both fall
// through to the field validators instead of a deserialization error.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateServiceBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default = "missing_price")]
    pub price_per_day: f64,
    pub image_url: Option<String>,
}

fn missing_price() -> f64 {
    f64::NAN
}

/// Absent fields keep their stored value. The service type is fixed at
/// creation and cannot be edited.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_day: Option<f64>,
    pub image_url: Option<String>,
}

#[utoipa::path(post, path = "/services", tag = "services",
    request_body = CreateServiceBody,
    responses(
        (status = 201, description = "Service listed"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    ValidJson(body): ValidJson<CreateServiceBody>,
) -> Result<(StatusCode, Json<service::Model>), ApiError> {
    let created = catalog::create_service(
        &state.db,
        actor,
        NewService {
            title: body.title,
            description: body.description,
            service_type: body.service_type,
            price_per_day: body.price_per_day,
            image_url: body.image_url,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/services", tag = "services",
    responses((status = 200, description = "Every listed service with its owner's public fields")))]
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ServiceWithOwner>>, ApiError> {
    let rows = catalog::list_services(&state.db).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/services/me", tag = "services",
    responses((status = 200, description = "Services owned by the caller")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<service::Model>>, ApiError> {
    let rows = catalog::list_services_by_owner(&state.db, actor).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service detail with ratings and the caller's request"),
        (status = 404, description = "No such service")
    ))]
pub async fn detail(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceDetail>, ApiError> {
    let detail = catalog::get_service_detail(&state.db, id, actor).await?;
    Ok(Json(detail))
}

#[utoipa::path(put, path = "/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service id")),
    request_body = UpdateServiceBody,
    responses(
        (status = 200, description = "Updated service"),
        (status = 403, description = "Caller does not own this service"),
        (status = 404, description = "No such service")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<UpdateServiceBody>,
) -> Result<Json<service::Model>, ApiError> {
    let updated = catalog::update_service(
        &state.db,
        id,
        actor,
        ServiceChanges {
            title: body.title,
            description: body.description,
            price_per_day: body.price_per_day,
            image_url: body.image_url,
        },
    )
    .await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service and its requests and ratings removed"),
        (status = 403, description = "Caller does not own this service"),
        (status = 404, description = "No such service")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    catalog::delete_service(&state.db, id, actor).await?;
    Ok(MessageResponse::new("Service deleted successfully"))
}
