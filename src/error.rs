//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for pools, items and drivers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key does not exist in the backend
    #[error("Key \"{0}\" does not exist")]
    KeyNotFound(String),

    /// Key or pool name rejected at the pool boundary
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// TTL outside the representable range
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Item holds no value to persist
    #[error("Item \"{0}\" has no value to save")]
    MissingValue(String),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend connectivity or protocol failure
    #[error("Backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::InvalidTtl(_)
            | CacheError::MissingValue(_) => StatusCode::BAD_REQUEST,
            CacheError::Backend(_) => StatusCode::BAD_GATEWAY,
            CacheError::Serialization(_) | CacheError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_message() {
        let err = CacheError::KeyNotFound("sessions:user42".to_string());
        assert_eq!(err.to_string(), "Key \"sessions:user42\" does not exist");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::KeyNotFound("k".into()), StatusCode::NOT_FOUND),
            (CacheError::InvalidKey("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidTtl("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::MissingValue("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
