use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use workflow::profile::{self, ProfileChanges, ProfileView};

use crate::errors::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::routes::auth::{auth_service, ServerState};
use crate::routes::MessageResponse;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileBody {
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PasswordBody {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[utoipa::path(get, path = "/profile", tag = "profile",
    responses(
        (status = 200, description = "The caller's profile"),
        (status = 404, description = "Account no longer exists")
    ))]
pub async fn show(
    State(state): State<ServerState>,
    Actor(actor): Actor,
) -> Result<Json<ProfileView>, ApiError> {
    let view = profile::get_profile(&state.db, actor).await?;
    Ok(Json(view))
}

#[utoipa::path(put, path = "/profile/edit", tag = "profile",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Updated profile"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or username taken by another account")
    ))]
pub async fn edit(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    ValidJson(body): ValidJson<ProfileBody>,
) -> Result<Json<ProfileView>, ApiError> {
    let view = profile::update_profile(
        &state.db,
        actor,
        ProfileChanges {
            email: body.email,
            username: body.username,
            phone_number: body.phone_number,
        },
    )
    .await?;
    Ok(Json(view))
}

#[utoipa::path(put, path = "/profile/edit/password", tag = "profile",
    request_body = PasswordBody,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing fields or weak new password"),
        (status = 401, description = "Old password does not match")
    ))]
pub async fn change_password(
    State(state): State<ServerState>,
    Actor(actor): Actor,
    ValidJson(body): ValidJson<PasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    if body.old_password.is_empty() || body.new_password.is_empty() {
        return Err(ApiError::validation("All fields are required."));
    }
    auth_service(&state)
        .change_password(actor, &body.old_password, &body.new_password)
        .await?;
    Ok(MessageResponse::new("Password updated successfully"))
}
