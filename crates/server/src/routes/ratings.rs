use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::rating;
use workflow::ratings::{self, NewRating};
use workflow::views::RatingWithService;

use crate::errors::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::routes::auth::ServerState;

/// A missing score falls through as 0 and fails the minimum check.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RatingBody {
    #[serde(default)]
    pub score: i16,
    pub comment: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RatingResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub rating: rating::Model,
}

#[utoipa::path(post, path = "/ratings/{id}", tag = "ratings",
    params(("id" = Uuid, Path, description = "Service id to rate")),
    request_body = RatingBody,
    responses(
        (status = 201, description = "Rating added", body = RatingResponse),
        (status = 400, description = "Score out of range"),
        (status = 403, description = "Caller has no authorized request for this service"),
        (status = 404, description = "No such service")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path(service_id): Path<Uuid>,
    ValidJson(body): ValidJson<RatingBody>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    let created = ratings::create_rating(
        &state.db,
        service_id,
        actor,
        NewRating { score: body.score, comment: body.comment },
    )
    .await?;
    let out = RatingResponse { message: "Rating added successfully".into(), rating: created };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(put, path = "/services/{id}/ratings/{rating_id}", tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Service id"),
        ("rating_id" = Uuid, Path, description = "Rating id")
    ),
    request_body = RatingBody,
    responses(
        (status = 200, description = "Rating updated", body = RatingResponse),
        (status = 403, description = "Caller did not write this rating"),
        (status = 404, description = "No such rating")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path((_service_id, rating_id)): Path<(Uuid, Uuid)>,
    ValidJson(body): ValidJson<RatingBody>,
) -> Result<Json<RatingResponse>, ApiError> {
    let updated =
        ratings::update_rating(&state.db, rating_id, actor, body.score, body.comment).await?;
    let out = RatingResponse { message: "Rating updated successfully".into(), rating: updated };
    Ok(Json(out))
}

#[utoipa::path(delete, path = "/services/{id}/ratings/{rating_id}", tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Service id"),
        ("rating_id" = Uuid, Path, description = "Rating id")
    ),
    responses(
        (status = 204, description = "Rating removed"),
        (status = 403, description = "Caller did not write this rating"),
        (status = 404, description = "No such rating")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    Path((_service_id, rating_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ratings::delete_rating(&state.db, rating_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/ratings/me", tag = "ratings",
    responses((status = 200, description = "Ratings the caller has written, newest first")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<RatingWithService>>, ApiError> {
    let rows = ratings::list_ratings_by_author(&state.db, actor).await?;
    Ok(Json(rows))
}
