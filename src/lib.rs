//! Cache Pool - namespaced cache items over pluggable key-value drivers
//!
//! Pools hand out lazily loaded items and persist them through a
//! [`driver::CacheDriver`], with Redis and in-memory drivers provided.

pub mod api;
pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheItem, CachePool, Expiration, Lookup};
pub use config::{Config, DriverKind};
pub use driver::{CacheDriver, MemoryDriver, RedisDriver};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
