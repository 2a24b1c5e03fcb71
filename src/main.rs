//! Cache Pool gateway
//!
//! Serves named cache pools over HTTP on top of the configured driver.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_pool::api::create_router;
use cache_pool::{
    spawn_cleanup_task, AppState, CacheDriver, Config, DriverKind, MemoryDriver, RedisDriver,
};

/// Main entry point for the cache pool gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured driver
/// 4. Start the TTL sweep when the memory driver is used
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_pool=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Pool gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: driver={}, default_ttl={}s, port={}, cleanup_interval={}s",
        config.driver, config.default_ttl, config.server_port, config.cleanup_interval
    );

    let kind = config.driver_kind()?;
    let (driver, cleanup_handle): (Arc<dyn CacheDriver>, Option<JoinHandle<()>>) = match kind {
        DriverKind::Redis => {
            let driver: Arc<dyn CacheDriver> = Arc::new(
                RedisDriver::connect(&config.redis_url)
                    .await
                    .with_context(|| format!("connecting to {}", config.redis_url))?,
            );
            (driver, None)
        }
        DriverKind::Memory => {
            let memory = Arc::new(MemoryDriver::new());
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("Background cleanup task started");
            let driver: Arc<dyn CacheDriver> = memory;
            (driver, Some(handle))
        }
    };
    info!("Driver initialized: {:?}", kind);

    let state = AppState::new(driver, config.driver.clone(), config.pool_default_ttl()?);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
