use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use api_error::{error_codes, ErrorResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            AppError::Database(_) => error_codes::DATABASE_ERROR,
            AppError::Redis(_) => error_codes::CACHE_ERROR,
            AppError::BadRequest(_) => error_codes::BAD_REQUEST,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::Internal(_) => error_codes::INTERNAL_SERVER_ERROR,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(code, &self.to_string()))
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;
