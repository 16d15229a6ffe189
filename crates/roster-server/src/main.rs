//! Roster Server - Main entry point

use anyhow::Result;
use roster_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::{info, warn};

use roster_server::{
    api,
    cache::{Cache, RedisCache},
    config::Config,
    db,
    features::FeatureState,
    ingest::{IngestPipeline, JobTracker},
    store::{PgEmployeeStore, SharedStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("roster-server")
        .filter_directives("roster_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence
    let log_config = log_config.with_env_overrides()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Roster Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    db::run_migrations(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    // Cache
    let cache = if config.cache.enabled {
        let redis = RedisCache::from_url(&config.cache.redis_url)?;
        let cache = Cache::new(Arc::new(redis), config.cache.ttl());
        match cache.health().await {
            Ok(()) => info!("Redis cache connected"),
            Err(e) => warn!(error = %e, "Redis unreachable at startup, continuing without cached reads"),
        }
        // Entries written before this process started may describe rows that have changed
        cache.invalidate_all().await;
        cache
    } else {
        info!("Cache is disabled (CACHE_ENABLED=false)");
        Cache::disabled()
    };

    let store: SharedStore = Arc::new(PgEmployeeStore::new(db_pool));
    let pipeline = IngestPipeline::new(store.clone(), cache.clone(), config.ingest.settings());
    let jobs = JobTracker::new(pipeline.clone(), config.ingest.max_workers);

    let state = FeatureState {
        store,
        cache,
        pipeline,
        jobs: jobs.clone(),
    };

    // Build the application router
    let app = api::create_router(state, &config);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    // Let background uploads finish before the pool is dropped
    jobs.shutdown().await;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
