use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Failures raised by [`Storage`](crate::core::storage::Storage).
///
/// Missing records are not errors: lookups return `Option` and
/// update/delete return `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("author_id is required")]
    AuthorIdRequired,

    #[error("invalid author_id '{0}', must be an integer")]
    InvalidAuthorId(String),

    #[error("invalid data for {entity}: {source}")]
    Validation {
        entity: &'static str,
        source: serde_json::Error,
    },

    #[error("no {entity} ids left to assign")]
    IdSpaceExhausted { entity: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// True for errors caused by the caller's input rather than the disk.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StorageError::AuthorIdRequired
                | StorageError::InvalidAuthorId(_)
                | StorageError::Validation { .. }
        )
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::InternalError(msg) => msg,
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({"error": msg}))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(format!("Error: {}", err))
        } else {
            tracing::error!(error = %err, "storage failure");
            ApiError::InternalError(err.to_string())
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
