//! API Routes
//!
//! Configures the Axum router with all cache gateway endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, commit_handler, delete_handler, exists_handler, get_handler, health_handler,
    save_handler, ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /pools/:pool/items` - Save (or defer) an item
/// - `GET /pools/:pool/items/:key` - Read an item
/// - `GET /pools/:pool/items/:key/exists` - Backend existence check
/// - `GET /pools/:pool/items/:key/ttl` - Backend expiration
/// - `DELETE /pools/:pool/items/:key` - Delete an item
/// - `POST /pools/:pool/commit` - Flush deferred saves
/// - `DELETE /pools/:pool` - Clear the pool namespace
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pools/:pool", delete(clear_handler))
        .route("/pools/:pool/items", put(save_handler))
        .route(
            "/pools/:pool/items/:key",
            get(get_handler).delete(delete_handler),
        )
        .route("/pools/:pool/items/:key/exists", get(exists_handler))
        .route("/pools/:pool/items/:key/ttl", get(ttl_handler))
        .route("/pools/:pool/commit", post(commit_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
