//! Background Tasks Module
//!
//! Contains background tasks that run periodically during gateway operation.
//!
//! # Tasks
//! - TTL Cleanup: Purges expired entries held by the in-memory driver

mod cleanup;

pub use cleanup::spawn_cleanup_task;
