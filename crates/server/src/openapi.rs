use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::verify,
        crate::routes::services::create,
        crate::routes::services::list,
        crate::routes::services::list_mine,
        crate::routes::services::detail,
        crate::routes::services::update,
        crate::routes::services::remove,
        crate::routes::requests::create,
        crate::routes::requests::list_mine,
        crate::routes::requests::list_for_service,
        crate::routes::requests::detail,
        crate::routes::requests::update_status,
        crate::routes::requests::remove,
        crate::routes::ratings::create,
        crate::routes::ratings::update,
        crate::routes::ratings::remove,
        crate::routes::ratings::list_mine,
        crate::routes::profile::show,
        crate::routes::profile::edit,
        crate::routes::profile::change_password,
        crate::routes::uploads::upload,
    ),
    components(
        schemas(
            HealthResponse,
            crate::errors::ProblemBody,
            crate::routes::MessageResponse,
            crate::routes::auth::SignupBody,
            crate::routes::auth::LoginBody,
            crate::routes::auth::SessionOutput,
            crate::routes::auth::VerifyOutput,
            crate::routes::services::CreateServiceBody,
            crate::routes::services::UpdateServiceBody,
            crate::routes::requests::UpdateStatusBody,
            crate::routes::ratings::RatingBody,
            crate::routes::ratings::RatingResponse,
            crate::routes::uploads::UploadResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "requests"),
        (name = "ratings"),
        (name = "profile"),
        (name = "uploads")
    )
)]
pub struct ApiDoc;
