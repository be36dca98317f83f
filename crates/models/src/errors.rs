use thiserror::Error;

/// Errors surfaced by entity helpers; the workflow layer maps these onto
/// its own error kinds before they reach the HTTP surface.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn db(err: sea_orm::DbErr) -> Self {
        Self::Db(err.to_string())
    }
}
