//! Driver Module
//!
//! Backend capability consumed by pools and items, plus its implementations.
//! Every key handed to a driver is already fully qualified (`pool:item`).

mod entry;
mod memory;
mod redis_driver;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::Result;

pub use self::memory::MemoryDriver;
pub use self::redis_driver::RedisDriver;

// == Public Constants ==
/// Separator placed between key parts
pub const KEY_DELIMITER: &str = ":";

/// Glob suffix matching every key under a prefix
pub const WILDCARD: &str = "*";

// == Expiration Format ==
/// Representation requested from [`CacheDriver::get_expiration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationFormat {
    /// Absolute UTC instant
    Absolute,
    /// Whole seconds remaining
    Remaining,
}

// == Expiry Reading ==
/// Expiration reported by a backend for a key that carries a TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReading {
    /// Expires at this UTC instant
    At(DateTime<Utc>),
    /// Whole seconds left
    Remaining(u64),
}

impl ExpiryReading {
    fn from_remaining(secs: u64, format: ExpirationFormat) -> Self {
        match format {
            ExpirationFormat::Remaining => ExpiryReading::Remaining(secs),
            ExpirationFormat::Absolute => {
                ExpiryReading::At(Utc::now() + Duration::seconds(secs as i64))
            }
        }
    }
}

// == Cache Driver ==
/// Primitive key/value/TTL operations a backend must provide.
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Returns the raw payload stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, permanently when `expires_at` is `None`.
    async fn set(&self, key: &str, value: &[u8], expires_at: Option<DateTime<Utc>>)
        -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Deletes every listed key and returns how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Deletes every key matching the glob `pattern` as one indivisible step.
    async fn delete_prefix(&self, pattern: &str) -> Result<u64>;

    /// Whole seconds left before `key` expires.
    ///
    /// `Ok(None)` means the key exists without expiration; an absent key is
    /// `CacheError::KeyNotFound`.
    async fn ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Joins key parts with [`KEY_DELIMITER`].
    fn build_key(&self, parts: &[&str]) -> String {
        build_key(parts)
    }

    /// Expiration of `key` in the requested representation.
    async fn get_expiration(
        &self,
        key: &str,
        format: ExpirationFormat,
    ) -> Result<Option<ExpiryReading>> {
        Ok(self
            .ttl(key)
            .await?
            .map(|secs| ExpiryReading::from_remaining(secs, format)))
    }
}

// == Utility Functions ==
/// Joins key parts with [`KEY_DELIMITER`].
pub fn build_key(parts: &[&str]) -> String {
    parts.join(KEY_DELIMITER)
}

/// Whole seconds from now until `expires_at`, rounded up. Zero or negative
/// means the instant has already passed.
pub fn seconds_until(expires_at: DateTime<Utc>) -> i64 {
    let millis = (expires_at - Utc::now()).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + 999) / 1000
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_joins_with_colon() {
        assert_eq!(build_key(&["sessions", "user42"]), "sessions:user42");
        assert_eq!(build_key(&["sessions", WILDCARD]), "sessions:*");
    }

    #[test]
    fn test_build_key_single_part() {
        assert_eq!(build_key(&["alone"]), "alone");
    }

    #[test]
    fn test_seconds_until_rounds_up() {
        let at = Utc::now() + Duration::milliseconds(1500);
        let secs = seconds_until(at);
        assert!(secs == 2 || secs == 1, "got {}", secs);
    }

    #[test]
    fn test_seconds_until_past_is_zero() {
        let at = Utc::now() - Duration::seconds(10);
        assert_eq!(seconds_until(at), 0);
    }

    #[test]
    fn test_reading_absolute_is_in_future() {
        let reading = ExpiryReading::from_remaining(60, ExpirationFormat::Absolute);
        match reading {
            ExpiryReading::At(at) => {
                let delta = (at - Utc::now()).num_seconds();
                assert!((59..=60).contains(&delta));
            }
            other => panic!("unexpected reading {:?}", other),
        }
    }

    #[test]
    fn test_reading_remaining() {
        assert_eq!(
            ExpiryReading::from_remaining(42, ExpirationFormat::Remaining),
            ExpiryReading::Remaining(42)
        );
    }
}
