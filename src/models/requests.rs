//! Request DTOs for the cache gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{validate_key, MAX_TTL_SECS};
use crate::error::{CacheError, Result};

/// Request body for the save operation (PUT /pools/:pool/items)
///
/// # Fields
/// - `key`: The item key inside the pool
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (pool default if not specified)
/// - `deferred`: Queue the save until the next commit
#[derive(Debug, Clone, Deserialize)]
pub struct SaveRequest {
    /// The item key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Defer persistence until commit
    #[serde(default)]
    pub deferred: bool,
}

impl SaveRequest {
    /// Validates the request data
    pub fn validate(&self) -> Result<()> {
        match self.ttl {
            Some(0) => {
                return Err(CacheError::InvalidRequest(
                    "TTL must be at least 1 second".to_string(),
                ));
            }
            Some(ttl) if ttl > MAX_TTL_SECS => {
                return Err(CacheError::InvalidRequest(format!(
                    "TTL must not exceed {} seconds",
                    MAX_TTL_SECS
                )));
            }
            _ => {}
        }
        validate_key(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_request_deserialize() {
        let json = r#"{"key": "user42", "value": {"id": 42}}"#;
        let req: SaveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "user42");
        assert_eq!(req.value, json!({"id": 42}));
        assert!(req.ttl.is_none());
        assert!(!req.deferred);
    }

    #[test]
    fn test_save_request_with_options() {
        let json = r#"{"key": "k", "value": null, "ttl": 60, "deferred": true}"#;
        let req: SaveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.value, Value::Null);
        assert_eq!(req.ttl, Some(60));
        assert!(req.deferred);
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SaveRequest {
            key: "".to_string(),
            value: json!("test"),
            ttl: None,
            deferred: false,
        };
        assert!(matches!(req.validate(), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let req = SaveRequest {
            key: "k".to_string(),
            value: json!("test"),
            ttl: Some(0),
            deferred: false,
        };
        assert!(matches!(req.validate(), Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_ttl_upper_bound() {
        let mut req = SaveRequest {
            key: "k".to_string(),
            value: json!("test"),
            ttl: Some(MAX_TTL_SECS),
            deferred: false,
        };
        assert!(req.validate().is_ok());

        for ttl in [MAX_TTL_SECS + 1, 100_000_000_000_000_000, u64::MAX] {
            req.ttl = Some(ttl);
            assert!(matches!(req.validate(), Err(CacheError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SaveRequest {
            key: "valid_key".to_string(),
            value: json!("test"),
            ttl: Some(60),
            deferred: false,
        };
        assert!(req.validate().is_ok());
    }
}
