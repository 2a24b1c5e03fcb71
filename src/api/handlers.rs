//! API Handlers
//!
//! HTTP request handlers exposing cache pools over the shared driver.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Duration;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::cache::CachePool;
use crate::driver::CacheDriver;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, CommitResponse, DeleteResponse, ExistsResponse, HealthResponse, ItemResponse,
    SaveRequest, SaveResponse, TtlResponse,
};

/// Application state shared across all handlers.
///
/// Pools are cheap views over the shared driver and are built per request;
/// only pools holding deferred saves are kept, until their commit.
#[derive(Clone)]
pub struct AppState {
    /// Backend shared by every pool
    pub driver: Arc<dyn CacheDriver>,
    /// Name reported by the health endpoint
    pub driver_name: String,
    /// Default TTL for every pool
    pub default_ttl: Option<Duration>,
    /// Pools with saves waiting for commit
    pub deferred: Arc<Mutex<HashMap<String, CachePool>>>,
}

impl AppState {
    /// Creates a new AppState over the given driver.
    pub fn new(
        driver: Arc<dyn CacheDriver>,
        driver_name: impl Into<String>,
        default_ttl: Option<Duration>,
    ) -> Self {
        Self {
            driver,
            driver_name: driver_name.into(),
            default_ttl,
            deferred: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builds a pool view named `name`.
    pub fn pool(&self, name: &str) -> Result<CachePool> {
        CachePool::new(name, self.default_ttl, self.driver.clone())
    }
}

/// Handler for PUT /pools/:pool/items
///
/// Saves the value immediately, or queues it when `deferred` is set.
pub async fn save_handler(
    State(state): State<AppState>,
    Path(pool_name): Path<String>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>> {
    req.validate()?;

    let pool = state.pool(&pool_name)?;
    let mut item = pool.get_item::<Value>(&req.key)?;
    item.set(req.value);
    if let Some(ttl) = req.ttl {
        item.expires_after_secs(ttl)?;
    }

    if !req.deferred {
        pool.save(&mut item).await?;
        return Ok(Json(SaveResponse::saved(req.key)));
    }

    let mut deferred = state.deferred.lock().await;
    let pool = match deferred.entry(pool_name) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(pool),
    };
    pool.save_deferred(item);

    Ok(Json(SaveResponse::deferred(req.key, pool.deferred_len())))
}

/// Handler for GET /pools/:pool/items/:key
///
/// Reads an item; a miss is reported as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((pool_name, key)): Path<(String, String)>,
) -> Result<Json<ItemResponse>> {
    let pool = state.pool(&pool_name)?;
    let mut item = pool.get_item::<Value>(&key)?;

    if !item.is_hit().await? {
        return Err(CacheError::KeyNotFound(item.full_key()));
    }
    let expires_at = item.get_expiration().await?.instant();
    let value = item.into_value().unwrap_or(Value::Null);

    Ok(Json(ItemResponse {
        key,
        value,
        hit: true,
        expires_at,
    }))
}

/// Handler for GET /pools/:pool/items/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path((pool_name, key)): Path<(String, String)>,
) -> Result<Json<ExistsResponse>> {
    let pool = state.pool(&pool_name)?;
    let exists = pool.has_item(&key).await?;

    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for GET /pools/:pool/items/:key/ttl
///
/// Reports the backend expiration; 404 when the key is absent.
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path((pool_name, key)): Path<(String, String)>,
) -> Result<Json<TtlResponse>> {
    let pool = state.pool(&pool_name)?;
    let item = pool.get_item::<Value>(&key)?;
    let ttl = state.driver.ttl(&item.full_key()).await?;

    Ok(Json(TtlResponse::from_remaining(key, ttl)))
}

/// Handler for DELETE /pools/:pool/items/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((pool_name, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let pool = state.pool(&pool_name)?;
    let deleted = pool.delete_item(&key).await?;

    Ok(Json(DeleteResponse { key, deleted }))
}

/// Handler for POST /pools/:pool/commit
///
/// Flushes the deferred queue of the pool, if any.
pub async fn commit_handler(
    State(state): State<AppState>,
    Path(pool_name): Path<String>,
) -> Result<Json<CommitResponse>> {
    let pool = {
        let mut deferred = state.deferred.lock().await;
        deferred.remove(&pool_name)
    };

    let (flushed, committed) = match pool {
        Some(mut pool) => (pool.deferred_len(), pool.commit().await),
        None => (0, true),
    };

    Ok(Json(CommitResponse {
        pool: pool_name,
        flushed,
        committed,
    }))
}

/// Handler for DELETE /pools/:pool
///
/// Deletes every key in the pool namespace.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(pool_name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let pool = state.pool(&pool_name)?;
    let cleared = pool.clear().await?;

    Ok(Json(ClearResponse {
        pool: pool_name,
        cleared,
    }))
}

/// Handler for GET /health
///
/// Returns health status of the gateway.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.driver_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(MemoryDriver::new()),
            "memory",
            Some(Duration::seconds(300)),
        )
    }

    fn save_request(key: &str, value: Value, deferred: bool) -> SaveRequest {
        SaveRequest {
            key: key.to_string(),
            value,
            ttl: None,
            deferred,
        }
    }

    fn item_path(pool: &str, key: &str) -> Path<(String, String)> {
        Path((pool.to_string(), key.to_string()))
    }

    #[tokio::test]
    async fn test_save_and_get_handler() {
        let state = test_state();

        let req = save_request("user42", json!({"id": 42}), false);
        let result = save_handler(State(state.clone()), Path("sessions".to_string()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), item_path("sessions", "user42"))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"id": 42}));
        assert!(response.hit);
        assert!(response.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let state = test_state();

        let result = get_handler(State(state), item_path("sessions", "nonexistent")).await;
        assert!(matches!(result, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_deferred_save_and_commit() {
        let state = test_state();

        for key in ["a", "b"] {
            let req = save_request(key, json!(key), true);
            let response = save_handler(State(state.clone()), Path("jobs".to_string()), Json(req))
                .await
                .unwrap();
            assert!(response.deferred);
        }

        let exists = exists_handler(State(state.clone()), item_path("jobs", "a"))
            .await
            .unwrap();
        assert!(!exists.exists);

        let commit = commit_handler(State(state.clone()), Path("jobs".to_string()))
            .await
            .unwrap();
        assert_eq!(commit.flushed, 2);
        assert!(commit.committed);

        let exists = exists_handler(State(state), item_path("jobs", "b"))
            .await
            .unwrap();
        assert!(exists.exists);
    }

    #[tokio::test]
    async fn test_commit_without_queue() {
        let response = commit_handler(State(test_state()), Path("idle".to_string()))
            .await
            .unwrap();
        assert_eq!(response.flushed, 0);
        assert!(response.committed);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let req = save_request("to_delete", json!("value"), false);
        save_handler(State(state.clone()), Path("p".to_string()), Json(req))
            .await
            .unwrap();

        let response = delete_handler(State(state.clone()), item_path("p", "to_delete"))
            .await
            .unwrap();
        assert!(response.deleted);

        let result = get_handler(State(state), item_path("p", "to_delete")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ttl_handler() {
        let state = test_state();

        let mut req = save_request("k", json!(1), false);
        req.ttl = Some(60);
        save_handler(State(state.clone()), Path("p".to_string()), Json(req))
            .await
            .unwrap();

        let response = ttl_handler(State(state.clone()), item_path("p", "k"))
            .await
            .unwrap();
        assert!((59..=60).contains(&response.ttl.unwrap()));

        let missing = ttl_handler(State(state), item_path("p", "missing")).await;
        assert!(matches!(missing, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();

        let req = save_request("k", json!(1), false);
        save_handler(State(state.clone()), Path("p".to_string()), Json(req))
            .await
            .unwrap();

        let response = clear_handler(State(state.clone()), Path("p".to_string()))
            .await
            .unwrap();
        assert!(response.cleared);

        let response = clear_handler(State(state), Path("p".to_string()))
            .await
            .unwrap();
        assert!(!response.cleared);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.driver, "memory");
    }

    #[tokio::test]
    async fn test_save_invalid_request() {
        let state = test_state();

        let req = save_request("", json!("value"), false);
        let result = save_handler(State(state.clone()), Path("p".to_string()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));

        let req = save_request("k", json!("value"), false);
        let result = save_handler(State(state), Path("bad*pool".to_string()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_save_out_of_range_ttl() {
        let state = test_state();

        for ttl in [100_000_000_000_000_000, u64::MAX] {
            let mut req = save_request("k", json!("value"), false);
            req.ttl = Some(ttl);
            let result = save_handler(State(state.clone()), Path("p".to_string()), Json(req)).await;
            assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        }

        let exists = exists_handler(State(state), item_path("p", "k"))
            .await
            .unwrap();
        assert!(!exists.exists);
    }
}
