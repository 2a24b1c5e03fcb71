//! Cache Module
//!
//! Namespaced item pools over a [`crate::driver::CacheDriver`].
//!
//! A pool hands out fresh [`CacheItem`]s, each of which lazily reads its value
//! from the driver, and persists them immediately or through a deferred queue.

pub mod codec;
mod expiration;
mod item;
mod pool;


// Re-export public types
pub use expiration::Expiration;
pub use item::{CacheItem, Lookup};
pub use pool::{validate_key, validate_pool_name, CachePool};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Characters an item key may not contain
pub const RESERVED_KEY_CHARS: &[char] = &['{', '}', '(', ')', '/', '\\', '@', ':'];

/// Longest TTL accepted for an item or a pool default (ten years)
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Glob metacharacters additionally refused in pool names
pub const GLOB_CHARS: &[char] = &['*', '?', '[', ']'];
