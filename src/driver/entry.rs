//! Stored Entry Module
//!
//! Payload plus expiration metadata kept by the in-memory driver.

use chrono::{DateTime, Utc};

// == Stored Entry ==
/// Represents a single payload held by [`super::MemoryDriver`].
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The serialized value
    pub value: Vec<u8>,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry expiring at the given instant, or never.
    pub fn new(value: Vec<u8>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value,
            expires_at: expires_at.map(|at| at.timestamp_millis()),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`Self::is_expired`] against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            if expires > now {
                (expires - now) as u64
            } else {
                0
            }
        })
    }

    /// Returns remaining TTL in whole seconds, rounded up, or None if no
    /// expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms.div_ceil(1000))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
