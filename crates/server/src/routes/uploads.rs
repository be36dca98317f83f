use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::ApiError;
use crate::extract::Actor;
use crate::routes::auth::ServerState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub file_url: String,
}

/// Accepts a multipart form with an `image` part, stores the file under
/// a fresh name and answers with the public URL the catalog can embed.
#[utoipa::path(post, path = "/upload", tag = "uploads",
    responses(
        (status = 200, description = "Stored; body carries the public URL", body = UploadResponse),
        (status = 400, description = "No image part, or extension not allowed"),
        (status = 401, description = "Missing or invalid token")
    ))]
pub async fn upload(
    State(state): State<ServerState>,
    Actor(_actor): Actor,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|r| ApiError::validation(r.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        let url = state.uploads.save(&original, &bytes).await?;
        return Ok(Json(UploadResponse { file_url: url }));
    }

    Err(ApiError::validation("No file uploaded!"))
}
