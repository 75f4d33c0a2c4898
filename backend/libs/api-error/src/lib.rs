/// Shared HTTP error body for all Orbe services
///
/// Every API error serializes as `{"error": {"code": ..., "message": ...}}`
/// so clients can branch on the machine-readable code regardless of which
/// service produced the response.
use serde::{Deserialize, Serialize};

/// Machine-readable error codes shared across services
pub mod error_codes {
    pub const QUERY_TOO_SHORT: &str = "QUERY_TOO_SHORT";
    pub const INVALID_TYPE: &str = "INVALID_TYPE";
    pub const SEARCH_ERROR: &str = "SEARCH_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const CACHE_ERROR: &str = "CACHE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_wire_shape() {
        let resp = ErrorResponse::new(error_codes::QUERY_TOO_SHORT, "query must be at least 2 characters");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"]["code"], "QUERY_TOO_SHORT");
        assert_eq!(json["error"]["message"], "query must be at least 2 characters");
    }
}
