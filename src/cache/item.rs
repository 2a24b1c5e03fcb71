//! Cache Item Module
//!
//! One key/value/expiration triple bound to the pool that created it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::codec;
use super::pool::PoolContext;
use super::Expiration;
use crate::driver::{ExpirationFormat, ExpiryReading};
use crate::error::Result;

// == Lookup ==
/// Outcome of the backend read behind an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The backend has not been consulted
    Pending,
    /// The backend held a value
    Hit,
    /// The backend held nothing under the key
    Miss,
}

// == Cache Item ==
/// A cached value as seen by a caller.
///
/// Items are cheap handles: nothing is read until [`CacheItem::get`] (or a
/// method depending on it) runs, and nothing is written until the item is
/// handed back to [`super::CachePool::save`] or
/// [`super::CachePool::save_deferred`].
pub struct CacheItem<T> {
    key: String,
    value: Option<T>,
    lookup: Lookup,
    expiration: Expiration,
    pool: Arc<PoolContext>,
}

impl<T> CacheItem<T> {
    pub(crate) fn new(key: String, pool: Arc<PoolContext>) -> Self {
        Self {
            key,
            value: None,
            lookup: Lookup::Pending,
            expiration: Expiration::Unknown,
            pool,
        }
    }

    /// The key inside the pool namespace.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fully-qualified key handed to the driver.
    pub fn full_key(&self) -> String {
        self.pool.full_key(&self.key)
    }

    /// Lookup state without touching the backend.
    pub fn state(&self) -> Lookup {
        self.lookup
    }

    /// In-memory value without touching the backend.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    // == Set ==
    /// Assigns the value and re-applies the pool default TTL.
    ///
    /// Call [`Self::expires_at`] or [`Self::expires_after`] afterwards to
    /// override the TTL.
    pub fn set(&mut self, value: T) -> &mut Self {
        self.value = Some(value);
        self.expiration = self.pool.default_expiration();
        self
    }

    // == Expiration setters ==
    /// Sets an absolute expiration; `None` falls back to the pool default
    /// TTL, or permanent storage when the pool has none.
    pub fn expires_at(&mut self, at: Option<DateTime<Utc>>) -> &mut Self {
        self.expiration = match at {
            Some(at) => Expiration::At(at),
            None => self.pool.default_expiration(),
        };
        self
    }

    /// Expires the item `ttl` from now.
    ///
    /// An out-of-range `ttl` is rejected and leaves the expiration unchanged.
    pub fn expires_after(&mut self, ttl: Duration) -> Result<&mut Self> {
        self.expiration = Expiration::after(ttl)?;
        Ok(self)
    }

    pub fn expires_after_secs(&mut self, secs: u64) -> Result<&mut Self> {
        self.expiration = Expiration::after_secs(secs)?;
        Ok(self)
    }

    /// Locally known expiration, without touching the backend.
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    // == Exists ==
    /// Asks the backend whether the key is present.
    ///
    /// Ignores the in-memory value, so it may disagree with a later
    /// [`Self::get`] if the backend changes in between.
    pub async fn exists(&self) -> Result<bool> {
        self.pool.driver.exists(&self.full_key()).await
    }

    // == Get Expiration ==
    /// Expiration of the item, read from the backend for a hit whose
    /// expiration is still unknown.
    pub async fn get_expiration(&mut self) -> Result<Expiration> {
        if self.lookup == Lookup::Hit && !self.expiration.is_known() {
            let reading = self
                .pool
                .driver
                .get_expiration(&self.full_key(), ExpirationFormat::Absolute)
                .await?;

            self.expiration = match reading {
                Some(ExpiryReading::At(at)) => Expiration::At(at),
                Some(ExpiryReading::Remaining(secs)) => Expiration::after_secs(secs)?,
                None => Expiration::Never,
            };
        }

        Ok(self.expiration)
    }
}

impl<T: DeserializeOwned> CacheItem<T> {
    // == Load ==
    /// Reads the backend once, unless a value is already held or a lookup
    /// already happened.
    pub(crate) async fn load(&mut self) -> Result<()> {
        if self.value.is_some() || self.lookup != Lookup::Pending {
            return Ok(());
        }

        let payload = self.pool.driver.get(&self.full_key()).await?;
        match payload {
            Some(bytes) => {
                self.value = Some(codec::decode(&bytes)?);
                self.lookup = Lookup::Hit;
            }
            None => self.lookup = Lookup::Miss,
        }

        Ok(())
    }

    // == Get ==
    /// The item value, loading it from the backend on first use.
    ///
    /// `None` means the backend held nothing and no value was assigned.
    pub async fn get(&mut self) -> Result<Option<&T>> {
        self.load().await?;
        Ok(self.value.as_ref())
    }

    // == Is Hit ==
    /// Whether the backend lookup found a value.
    ///
    /// Performs the lookup when none happened yet and no value was assigned
    /// locally; a locally assigned value that never went through a lookup is
    /// not a hit.
    pub async fn is_hit(&mut self) -> Result<bool> {
        self.load().await?;
        Ok(self.lookup == Lookup::Hit)
    }
}

impl<T: Serialize> CacheItem<T> {
    /// Serialized form of the held value.
    pub(crate) fn payload(&self) -> Result<Option<Vec<u8>>> {
        self.value.as_ref().map(codec::encode).transpose()
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheItem")
            .field("pool", &self.pool.name)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("lookup", &self.lookup)
            .field("expiration", &self.expiration)
            .finish()
    }
}
