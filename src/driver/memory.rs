//! In-Memory Driver
//!
//! HashMap-backed driver honouring the same contract as the Redis driver.
//! Expired entries are invisible to reads and are dropped lazily or by
//! [`MemoryDriver::purge_expired`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::entry::{current_timestamp_ms, StoredEntry};
use super::CacheDriver;
use crate::error::{CacheError, Result};

// == Memory Driver ==
/// Process-local backend guarded by a single lock.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryDriver {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = current_timestamp_ms();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheDriver for MemoryDriver {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        let value = entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone());

        match &value {
            Some(_) => debug!("Memory hit for key '{}'", key),
            None => debug!("Memory miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let entry = StoredEntry::new(value.to_vec(), expires_at);
        let mut entries = self.entries.write().await;

        if entry.is_expired() {
            entries.remove(key);
            debug!("Dropped already expired write for key '{}'", key);
        } else {
            entries.insert(key.to_string(), entry);
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|entry| !entry.is_expired()))
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut entries = self.entries.write().await;
        let now = current_timestamp_ms();
        let mut deleted = 0;

        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if !entry.is_expired_at(now) {
                    deleted += 1;
                }
            }
        }

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn delete_prefix(&self, pattern: &str) -> Result<u64> {
        // One write guard for match and removal.
        let mut entries = self.entries.write().await;
        let now = current_timestamp_ms();
        let mut deleted = 0;

        entries.retain(|key, entry| {
            if !glob_match(pattern, key) {
                return true;
            }
            if !entry.is_expired_at(now) {
                deleted += 1;
            }
            false
        });

        debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
        Ok(deleted)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(entry.ttl_remaining()),
            _ => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }
}

// == Glob Matching ==
/// Matches `key` against a Redis-style glob supporting `*` and `?`.
fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(&c) if c == '?' || c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    k = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
