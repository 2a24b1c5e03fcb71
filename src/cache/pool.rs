//! Cache Pool Module
//!
//! Namespaced façade owning the driver handle, the default TTL policy and the
//! deferred save queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::expiration::max_ttl;
use super::{CacheItem, Expiration, GLOB_CHARS, MAX_KEY_LENGTH, MAX_TTL_SECS, RESERVED_KEY_CHARS};
use crate::driver::{CacheDriver, WILDCARD};
use crate::error::{CacheError, Result};

// == Pool Context ==
/// State shared between a pool and every item it creates.
pub(crate) struct PoolContext {
    pub(crate) name: String,
    pub(crate) default_ttl: Option<Duration>,
    pub(crate) driver: Arc<dyn CacheDriver>,
}

impl PoolContext {
    pub(crate) fn full_key(&self, key: &str) -> String {
        self.driver.build_key(&[self.name.as_str(), key])
    }

    pub(crate) fn default_expiration(&self) -> Expiration {
        Expiration::from_ttl(self.default_ttl)
    }

    /// Writes `item` under this pool's namespace.
    async fn persist<T>(&self, item: &mut CacheItem<T>) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        item.load().await?;

        let expiration = match item.get_expiration().await {
            Ok(expiration) => expiration,
            // The hit vanished since it was read; write it back fresh.
            Err(CacheError::KeyNotFound(_)) => Expiration::Unknown,
            Err(e) => return Err(e),
        };
        let expires_at = match expiration {
            Expiration::Unknown => self.default_expiration().instant(),
            known => known.instant(),
        };

        let payload = item
            .payload()?
            .ok_or_else(|| CacheError::MissingValue(item.key().to_string()))?;

        self.driver
            .set(&self.full_key(item.key()), &payload, expires_at)
            .await
    }
}

// == Pending Save ==
/// Type-erased item waiting in the deferred queue.
#[async_trait]
trait PendingSave: Send + Sync {
    fn key(&self) -> &str;

    async fn persist(&mut self, pool: &PoolContext) -> Result<()>;
}

#[async_trait]
impl<T> PendingSave for CacheItem<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn key(&self) -> &str {
        CacheItem::key(self)
    }

    async fn persist(&mut self, pool: &PoolContext) -> Result<()> {
        pool.persist(self).await
    }
}

// == Cache Pool ==
/// A named namespace of cache items over a shared driver.
///
/// Every key the pool writes is `name:key`, so [`CachePool::clear`] only
/// removes this pool's own entries.
pub struct CachePool {
    ctx: Arc<PoolContext>,
    deferred: VecDeque<Box<dyn PendingSave>>,
}

impl CachePool {
    // == Constructor ==
    /// Creates a pool named `name` over `driver`.
    ///
    /// # Arguments
    /// * `name` - Namespace prefix, validated with [`validate_pool_name`]
    /// * `default_ttl` - TTL applied by [`CacheItem::set`], `None` = permanent
    /// * `driver` - Backend shared with other pools
    pub fn new(
        name: impl Into<String>,
        default_ttl: Option<Duration>,
        driver: Arc<dyn CacheDriver>,
    ) -> Result<Self> {
        let name = name.into();
        validate_pool_name(&name)?;

        if let Some(ttl) = default_ttl {
            if ttl <= Duration::zero() {
                return Err(CacheError::Config(format!(
                    "Default TTL for pool '{}' must be positive",
                    name
                )));
            }
            if ttl > max_ttl() {
                return Err(CacheError::Config(format!(
                    "Default TTL for pool '{}' exceeds the maximum of {}s",
                    name, MAX_TTL_SECS
                )));
            }
        }

        Ok(Self {
            ctx: Arc::new(PoolContext {
                name,
                default_ttl,
                driver,
            }),
            deferred: VecDeque::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.ctx.name
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.ctx.default_ttl
    }

    pub fn driver(&self) -> &Arc<dyn CacheDriver> {
        &self.ctx.driver
    }

    // == Items ==
    /// Returns a fresh, unfetched item for `key`.
    ///
    /// Every call builds a new item; nothing is shared between calls.
    pub fn get_item<T>(&self, key: &str) -> Result<CacheItem<T>> {
        validate_key(key)?;
        Ok(CacheItem::new(key.to_string(), self.ctx.clone()))
    }

    /// Returns one fresh item per key, in input order.
    pub fn get_items<T, K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<CacheItem<T>>> {
        keys.iter().map(|key| self.get_item(key.as_ref())).collect()
    }

    /// Checks the backend for `key` without building an item.
    pub async fn has_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.ctx.driver.exists(&self.ctx.full_key(key)).await
    }

    // == Clear ==
    /// Deletes every entry in this pool's namespace.
    ///
    /// Returns true when at least one key was removed.
    pub async fn clear(&self) -> Result<bool> {
        let pattern = self.ctx.driver.build_key(&[self.ctx.name.as_str(), WILDCARD]);
        let deleted = self.ctx.driver.delete_prefix(&pattern).await?;

        info!("Cleared pool '{}': {} keys removed", self.ctx.name, deleted);
        Ok(deleted > 0)
    }

    // == Delete ==
    /// Deletes one item; true when it existed.
    pub async fn delete_item(&self, key: &str) -> Result<bool> {
        Ok(self.delete_items(&[key]).await? > 0)
    }

    /// Deletes every listed item in a single driver call.
    ///
    /// Returns the number of keys that existed.
    pub async fn delete_items<K: AsRef<str>>(&self, keys: &[K]) -> Result<u64> {
        let full_keys = keys
            .iter()
            .map(|key| {
                validate_key(key.as_ref())?;
                Ok(self.ctx.full_key(key.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;

        self.ctx.driver.delete(&full_keys).await
    }

    // == Save ==
    /// Persists `item` immediately under this pool's namespace.
    ///
    /// The value is loaded first if the item never read it. An item with no
    /// value (a miss that was never assigned) is rejected with
    /// [`CacheError::MissingValue`]. The item's expiration is used when known,
    /// the pool default TTL otherwise.
    pub async fn save<T>(&self, item: &mut CacheItem<T>) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        validate_key(item.key())?;
        self.ctx.persist(item).await?;

        debug!("Saved '{}' in pool '{}'", item.key(), self.ctx.name);
        Ok(())
    }

    /// Queues `item` for the next [`CachePool::commit`]. No backend I/O.
    pub fn save_deferred<T>(&mut self, item: CacheItem<T>) -> &mut Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.deferred.push_back(Box::new(item));
        self
    }

    /// Number of items waiting for [`CachePool::commit`].
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    // == Commit ==
    /// Saves every deferred item in the order it was queued.
    ///
    /// Every item is attempted even after a failure. Failures are logged
    /// and reported only through a `false` return; the queue is empty
    /// afterwards either way.
    pub async fn commit(&mut self) -> bool {
        let ctx = self.ctx.clone();
        let total = self.deferred.len();
        let mut failed = 0;

        while let Some(mut item) = self.deferred.pop_front() {
            if let Err(e) = item.persist(&ctx).await {
                warn!(
                    "Deferred save of '{}' in pool '{}' failed: {}",
                    item.key(),
                    ctx.name,
                    e
                );
                failed += 1;
            }
        }

        info!(
            "Committed pool '{}': {} saved, {} failed",
            ctx.name,
            total - failed,
            failed
        );
        failed == 0
    }
}

impl fmt::Debug for CachePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePool")
            .field("name", &self.ctx.name)
            .field("default_ttl", &self.ctx.default_ttl)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

// == Validation ==
/// Checks an item key: non-empty, at most [`MAX_KEY_LENGTH`] bytes, no
/// [`RESERVED_KEY_CHARS`].
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if let Some(c) = key.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(CacheError::InvalidKey(format!(
            "Key '{}' contains reserved character '{}'",
            key, c
        )));
    }
    Ok(())
}

/// Checks a pool name: the key rules plus no glob metacharacters, so the
/// namespace wildcard cannot reach into other pools.
pub fn validate_pool_name(name: &str) -> Result<()> {
    validate_key(name)?;
    if let Some(c) = name.chars().find(|c| GLOB_CHARS.contains(c)) {
        return Err(CacheError::InvalidKey(format!(
            "Pool name '{}' contains glob character '{}'",
            name, c
        )));
    }
    Ok(())
}
