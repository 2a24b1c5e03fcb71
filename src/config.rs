//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;

use chrono::Duration;

use crate::cache::MAX_TTL_SECS;
use crate::error::{CacheError, Result};

// == Driver Kind ==
/// Backend selected for every pool served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Redis,
    Memory,
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend name, `redis` or `memory`
    pub driver: String,
    /// Redis connection URL
    pub redis_url: String,
    /// Default TTL in seconds applied to new pools, 0 = permanent
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Memory driver sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DRIVER` - `redis` or `memory` (default: memory)
    /// - `REDIS_URL` - Redis connection URL (default: redis://127.0.0.1:6379/)
    /// - `DEFAULT_TTL` - Pool default TTL in seconds, 0 disables it (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Memory sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            driver: env::var("CACHE_DRIVER").unwrap_or(defaults.driver),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Parses the configured backend name.
    pub fn driver_kind(&self) -> Result<DriverKind> {
        match self.driver.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(DriverKind::Redis),
            "memory" => Ok(DriverKind::Memory),
            other => Err(CacheError::Config(format!(
                "Unknown cache driver '{}', expected 'redis' or 'memory'",
                other
            ))),
        }
    }

    /// Default TTL for new pools, `None` when set to 0.
    pub fn pool_default_ttl(&self) -> Result<Option<Duration>> {
        match self.default_ttl {
            0 => Ok(None),
            secs if secs > MAX_TTL_SECS => Err(CacheError::Config(format!(
                "DEFAULT_TTL of {}s exceeds the maximum of {}s",
                secs, MAX_TTL_SECS
            ))),
            secs => Ok(Some(Duration::seconds(secs as i64))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: "memory".to_string(),
            redis_url: "redis://127.0.0.1:6379/".to_string(),
            default_ttl: 300,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
