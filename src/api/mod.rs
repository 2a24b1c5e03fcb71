//! API Module
//!
//! HTTP handlers and routing for the cache gateway REST API.
//!
//! # Endpoints
//! - `PUT /pools/:pool/items` - Save or defer an item
//! - `GET /pools/:pool/items/:key` - Read an item
//! - `GET /pools/:pool/items/:key/exists` - Existence check
//! - `GET /pools/:pool/items/:key/ttl` - Remaining TTL
//! - `DELETE /pools/:pool/items/:key` - Delete an item
//! - `POST /pools/:pool/commit` - Flush deferred saves
//! - `DELETE /pools/:pool` - Clear a pool
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
