//! Response DTOs for the cache gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Response body for GET /pools/:pool/items/:key
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Whether the backend lookup found the value
    pub hit: bool,
    /// Expiration instant, null when permanent
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response body for PUT /pools/:pool/items
#[derive(Debug, Clone, Serialize)]
pub struct SaveResponse {
    /// Success message
    pub message: String,
    /// The key that was saved
    pub key: String,
    /// Whether the save waits for a commit
    pub deferred: bool,
    /// Items waiting for commit in this pool
    pub pending: usize,
}

impl SaveResponse {
    /// Creates a response for an immediate save
    pub fn saved(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' saved successfully", key),
            key,
            deferred: false,
            pending: 0,
        }
    }

    /// Creates a response for a deferred save
    pub fn deferred(key: impl Into<String>, pending: usize) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' queued for commit", key),
            key,
            deferred: true,
            pending,
        }
    }
}

/// Response body for GET /pools/:pool/items/:key/exists
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for GET /pools/:pool/items/:key/ttl
#[derive(Debug, Clone, Serialize)]
pub struct TtlResponse {
    pub key: String,
    /// Expiration instant, null when permanent
    pub expires_at: Option<DateTime<Utc>>,
    /// Seconds remaining, null when permanent
    pub ttl: Option<u64>,
}

impl TtlResponse {
    /// Builds the response from the seconds remaining reported by the backend
    pub fn from_remaining(key: impl Into<String>, ttl: Option<u64>) -> Self {
        Self {
            key: key.into(),
            expires_at: ttl.map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64)),
            ttl,
        }
    }
}

/// Response body for DELETE /pools/:pool/items/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// The key that was targeted
    pub key: String,
    /// Whether the key existed
    pub deleted: bool,
}

/// Response body for POST /pools/:pool/commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitResponse {
    pub pool: String,
    /// Number of items that were waiting
    pub flushed: usize,
    /// False when any deferred save failed
    pub committed: bool,
}

/// Response body for DELETE /pools/:pool
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub pool: String,
    /// Whether any key was removed
    pub cleared: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Active backend driver
    pub driver: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(driver: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            driver: driver.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_response_serialize() {
        let resp = SaveResponse::saved("my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
        assert!(json.contains(r#""deferred":false"#));
    }

    #[test]
    fn test_deferred_response() {
        let resp = SaveResponse::deferred("k", 3);
        assert!(resp.deferred);
        assert_eq!(resp.pending, 3);
    }

    #[test]
    fn test_ttl_response_permanent() {
        let resp = TtlResponse::from_remaining("k", None);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["ttl"].is_null());
        assert!(json["expires_at"].is_null());
    }

    #[test]
    fn test_ttl_response_with_ttl() {
        let resp = TtlResponse::from_remaining("k", Some(60));
        let delta = (resp.expires_at.unwrap() - Utc::now()).num_seconds();
        assert!((59..=60).contains(&delta));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("memory");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("memory"));
        assert!(json.contains("timestamp"));
    }
}
