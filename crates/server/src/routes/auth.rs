use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::user;
use workflow::auth::domain::{LoginInput, SignupInput};
use workflow::auth::repo::seaorm::SeaOrmAuthRepository;
use workflow::auth::service::{AuthConfig, AuthService};
use workflow::errors::WorkflowError;
use workflow::uploads::DiskUploadStore;

use crate::errors::ApiError;
use crate::extract::{Actor, ValidJson, INVALID_TOKEN};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub uploads: DiskUploadStore,
}

pub(crate) fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: state.db.clone() }),
        AuthConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            password_algorithm: "argon2".into(),
        },
    )
}

// Required strings default to empty so absent fields fail the same
// "All fields are required." check as empty ones.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SignupBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionOutput {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VerifyOutput {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

fn session_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new("auth_token", token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/auth/signup", tag = "auth",
    request_body = SignupBody,
    responses(
        (status = 201, description = "Account created", body = SessionOutput),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    ))]
pub async fn signup(
    State(state): State<ServerState>,
    jar: CookieJar,
    ValidJson(body): ValidJson<SignupBody>,
) -> Result<(StatusCode, CookieJar, Json<SessionOutput>), ApiError> {
    let session = auth_service(&state)
        .signup(SignupInput {
            email: body.email,
            username: body.username,
            password: body.password,
            phone_number: body.phone_number,
            address: body.address,
            city: body.city,
            profile_picture: body.profile_picture,
        })
        .await?;

    let jar = jar.add(session_cookie(&session.token));
    let out = SessionOutput {
        user_id: session.user.id,
        username: session.user.username,
        email: session.user.email,
        token: session.token,
    };
    Ok((StatusCode::CREATED, jar, Json(out)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Logged in", body = SessionOutput),
        (status = 401, description = "Unknown email or wrong password")
    ))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    ValidJson(body): ValidJson<LoginBody>,
) -> Result<(CookieJar, Json<SessionOutput>), ApiError> {
    let session = auth_service(&state)
        .login(LoginInput { email: body.email, password: body.password })
        .await?;

    let jar = jar.add(session_cookie(&session.token));
    let out = SessionOutput {
        user_id: session.user.id,
        username: session.user.username,
        email: session.user.email,
        token: session.token,
    };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth",
    responses((status = 204, description = "Session cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    // removal must carry the same path the login cookie was set with
    let mut removal = Cookie::from("auth_token");
    removal.set_path("/");
    let jar = jar.remove(removal);
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/verify", tag = "auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyOutput),
        (status = 401, description = "Missing, invalid or expired token")
    ))]
pub async fn verify(
    State(state): State<ServerState>,
    Actor(actor): Actor,
) -> Result<Json<VerifyOutput>, ApiError> {
    // A token for a since-deleted account is as good as expired.
    let found = user::Entity::find_by_id(actor)
        .one(&state.db)
        .await
        .map_err(WorkflowError::from)?
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

    Ok(Json(VerifyOutput {
        user_id: found.id,
        email: found.email,
        username: found.username,
    }))
}
