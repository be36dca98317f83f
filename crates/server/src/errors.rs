use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use workflow::errors::WorkflowError;

/// Wire shape of every error response. `instance` is the request path,
/// filled in by [`attach_instance`]; `errors` lists the individual
/// failures behind a VALIDATION response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub status: u16,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Error half of every handler. Renders as a [`ProblemBody`] and stashes
/// a copy in the response extensions so the path middleware can complete
/// the `instance` field.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self { status, kind, message: message.into(), errors: None }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "VALIDATION",
            errors: Some(vec![message.clone()]),
            message,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal server error.")
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(msgs) => {
                let message = if msgs.len() == 1 {
                    msgs[0].clone()
                } else {
                    "Validation failed.".to_string()
                };
                Self {
                    status: StatusCode::BAD_REQUEST,
                    kind: "VALIDATION",
                    message,
                    errors: Some(msgs),
                }
            }
            WorkflowError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            WorkflowError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            WorkflowError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "CONFLICT", msg),
            WorkflowError::Unauthorized(msg) => Self::unauthorized(msg),
            WorkflowError::Storage(msg) | WorkflowError::Db(msg) => {
                // keep the detail in the log, not on the wire
                error!(detail = %msg, "internal error");
                Self::internal()
            }
        }
    }
}

impl From<workflow::auth::errors::AuthError> for ApiError {
    fn from(err: workflow::auth::errors::AuthError) -> Self {
        WorkflowError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemBody {
            kind: self.kind.to_string(),
            message: self.message,
            status: self.status.as_u16(),
            instance: String::new(),
            errors: self.errors,
        };
        let mut res = (self.status, Json(&body)).into_response();
        res.extensions_mut().insert(body);
        res
    }
}

/// Middleware that rewrites error bodies with the request path in
/// `instance`. Runs inside the CORS and trace layers so their headers
/// still apply to the rebuilt response.
pub async fn attach_instance(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let res = next.run(req).await;

    let (mut parts, body) = res.into_parts();
    if let Some(mut problem) = parts.extensions.remove::<ProblemBody>() {
        problem.instance = path;
        let mut rebuilt = (parts.status, Json(problem)).into_response();
        // carry over everything but the now-stale content-length
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        for (name, value) in parts.headers.iter() {
            if name != axum::http::header::CONTENT_TYPE {
                rebuilt.headers_mut().insert(name.clone(), value.clone());
            }
        }
        return rebuilt;
    }
    Response::from_parts(parts, body)
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
