use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::{attach_instance, ApiError};
use crate::openapi::ApiDoc;
use crate::routes::auth::ServerState;

pub mod auth;
pub mod profile;
pub mod ratings;
pub mod requests;
pub mod services;
pub mod uploads;

/// Plain confirmation payload for deletes and password changes.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self { message: message.to_string() })
    }
}

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    ApiError::not_found("This route does not exist")
}

/// Assemble the full application router. Protection is carried by the
/// handlers themselves: anything taking an [`crate::extract::Actor`]
/// rejects callers without a valid token.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/verify", get(auth::verify))
        .route("/services", get(services::list).post(services::create))
        .route("/services/me", get(services::list_mine))
        .route(
            "/services/:id",
            get(services::detail).put(services::update).delete(services::remove),
        )
        .route(
            "/services/:id/ratings/:rating_id",
            put(ratings::update).delete(ratings::remove),
        )
        .route("/requests/user", get(requests::list_mine))
        .route("/requests/service/:id", get(requests::list_for_service))
        // one registration: POST treats :id as the service to request,
        // the other verbs treat it as the request itself
        .route(
            "/requests/:id",
            post(requests::create)
                .get(requests::detail)
                .put(requests::update_status)
                .delete(requests::remove),
        )
        .route("/ratings/me", get(ratings::list_mine))
        .route("/ratings/:id", post(ratings::create))
        .route("/profile", get(profile::show))
        .route("/profile/edit", put(profile::edit))
        .route("/profile/edit/password", put(profile::change_password))
        .route("/upload", post(uploads::upload))
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .fallback(not_found)
        .with_state(state)
        // innermost: fill `instance` before cors/trace see the response
        .layer(middleware::from_fn(attach_instance))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
