use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::Json;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use workflow::auth::service::decode_token;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Verified caller identity. Accepts a `Bearer` token in the
/// `Authorization` header or the `auth_token` cookie set at login; any
/// missing, malformed or expired token is a 401.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

#[async_trait]
impl FromRequestParts<ServerState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);

        let token = match bearer {
            Some(t) => t,
            None => {
                let jar = CookieJar::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::unauthorized(INVALID_TOKEN))?;
                jar.get("auth_token")
                    .map(|c| c.value().to_string())
                    .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?
            }
        };

        let claims = decode_token(&token, &state.auth.jwt_secret)
            .map_err(|_| ApiError::unauthorized(INVALID_TOKEN))?;
        Ok(Actor(claims.sub))
    }
}

/// `Json<T>` wrapper that reports body problems in the standard error
/// shape instead of axum's plain-text rejection.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
