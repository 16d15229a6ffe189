//! HTTP surface: the application router and the health endpoint

pub mod response;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

use crate::cache::Cache;
use crate::config::Config;
use crate::features::{self, FeatureState};
use crate::middleware;
use crate::store::SharedStore;
use response::{ApiResponse, ApiResult, AppError};

/// State of the top-level (non-feature) routes
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub cache: Cache,
}

/// Build the complete application router
///
/// Every route lives under `/api`. Layers apply from innermost to outermost:
/// compression, request tracing, CORS.
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let app_state = AppState {
        store: state.store.clone(),
        cache: state.cache.clone(),
    };

    let api = Router::new()
        .route("/health", get(health_check))
        .with_state(app_state)
        .merge(features::router(state, config.ingest.body_limit()));

    Router::new()
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
///
/// The database is required: when it cannot be reached the answer is
/// `503 Service Unavailable`. An unreachable cache only degrades the status,
/// since every cache call already falls back to storage.
async fn health_check(State(state): State<AppState>) -> ApiResult<Response> {
    if let Err(e) = state.store.ping().await {
        tracing::error!("Database health check failed: {:?}", e);
        return Err(AppError::ServiceUnavailable(
            "database is unavailable".to_string(),
        ));
    }

    let (status, cache_status) = match state.cache.health().await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            ("degraded", "disconnected")
        },
    };

    let stats = state.cache.stats().await;

    Ok(ApiResponse::success(json!({
        "status": status,
        "database": "connected",
        "cache": {
            "status": cache_status,
            "stats": stats,
        },
    }))
    .into_response())
}
