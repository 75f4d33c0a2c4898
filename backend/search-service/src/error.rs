use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use api_error::{error_codes, ErrorResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("query must be at least 2 characters")]
    QueryTooShort,

    #[error("type must be one of: posts, users, hashtags")]
    InvalidType,

    #[error("search backend error: {0}")]
    Search(#[from] crate::es::EsError),

    #[error("search timed out")]
    SearchTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::QueryTooShort | AppError::InvalidType => StatusCode::BAD_REQUEST,
            AppError::Search(_) | AppError::SearchTimeout | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            AppError::QueryTooShort => error_codes::QUERY_TOO_SHORT,
            AppError::InvalidType => error_codes::INVALID_TYPE,
            AppError::Search(_) | AppError::SearchTimeout => error_codes::SEARCH_ERROR,
            AppError::Internal(_) => error_codes::INTERNAL_SERVER_ERROR,
        };

        // Backend failures surface as a generic search error, never as the
        // transport detail
        let message = match self {
            AppError::Search(_) | AppError::SearchTimeout => {
                "An error occurred while searching".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(code, &message))
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;
