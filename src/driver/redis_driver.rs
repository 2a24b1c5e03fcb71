//! Redis Driver
//!
//! Translates driver operations into Redis commands over a shared
//! `ConnectionManager`. Reconnection and request multiplexing are left to the
//! redis client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::{debug, info};

use super::{seconds_until, CacheDriver};
use crate::error::{CacheError, Result};

/// Deletes every key matching `ARGV[1]` inside one server-side call.
///
/// `DEL` is issued in chunks because `unpack` is bounded by the Lua stack,
/// and never with zero arguments.
const DELETE_PREFIX_SCRIPT: &str = r#"
local keys = redis.call('KEYS', ARGV[1])
local deleted = 0
for i = 1, #keys, 5000 do
    deleted = deleted + redis.call('DEL', unpack(keys, i, math.min(i + 4999, #keys)))
end
return deleted
"#;

/// `TTL` reply for a missing key
const TTL_KEY_MISSING: i64 = -2;
/// `TTL` reply for a key without expiration
const TTL_NO_EXPIRY: i64 = -1;

// == Redis Driver ==
/// Driver backed by a Redis server.
#[derive(Clone)]
pub struct RedisDriver {
    conn: ConnectionManager,
    delete_prefix: Script,
}

impl RedisDriver {
    // == Constructor ==
    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379/`).
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting Redis driver to {}", url);

        let client = Client::open(url)?;
        let conn = client.get_connection_manager().await?;

        Ok(Self::from_manager(conn))
    }

    /// Wraps an already established connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self {
            conn,
            delete_prefix: Script::new(DELETE_PREFIX_SCRIPT),
        }
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl CacheDriver for RedisDriver {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn();
        let value: Option<Vec<u8>> = conn.get(key).await?;

        match &value {
            Some(_) => debug!("Redis hit for key '{}'", key),
            None => debug!("Redis miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut conn = self.conn();

        match expires_at {
            Some(at) => {
                let ttl_secs = seconds_until(at);
                if ttl_secs <= 0 {
                    // SETEX rejects a zero TTL; an elapsed deadline is a delete.
                    let _: i64 = conn.del(key).await?;
                    debug!("Dropped already expired write for key '{}'", key);
                } else {
                    let _: () = conn.set_ex(key, value, ttl_secs as u64).await?;
                    debug!("Stored key '{}' with TTL {}s", key, ttl_secs);
                }
            }
            None => {
                let _: () = conn.set(key, value).await?;
                debug!("Stored key '{}' without expiration", key);
            }
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn();
        let deleted: u64 = conn.del(keys).await?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn delete_prefix(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.conn();
        let deleted: u64 = self
            .delete_prefix
            .arg(pattern)
            .invoke_async(&mut conn)
            .await?;

        debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
        Ok(deleted)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.conn();
        let ttl: i64 = conn.ttl(key).await?;

        match ttl {
            TTL_KEY_MISSING => Err(CacheError::KeyNotFound(key.to_string())),
            TTL_NO_EXPIRY => Ok(None),
            secs => Ok(Some(secs.max(0) as u64)),
        }
    }
}
