//! Roster Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! HTTP service for managing employee records.
//!
//! # Overview
//!
//! - **Spreadsheet ingestion**: `.xlsx`/`.xls` uploads are parsed, validated row by row
//!   and stored in batches, synchronously or as background jobs
//! - **Record API**: create, read, update, delete, paginate and search employees
//! - **Read-through cache**: Redis in front of PostgreSQL, best-effort
//!
//! # Architecture
//!
//! The API follows a **CQRS (Command Query Responsibility Segregation)** layout: each
//! feature under [`features`] owns its commands (writes), queries (reads) and routes.
//! Storage sits behind the [`store::EmployeeStore`] trait and caching behind
//! [`cache::CacheBackend`], so both can be swapped for in-memory versions in tests.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access and migrations
//! - **deadpool-redis**: pooled Redis connections
//! - **calamine**: spreadsheet decoding
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use roster_server::{api, cache::Cache, config::Config, features::FeatureState};
//! use roster_server::ingest::{IngestPipeline, JobTracker};
//! use roster_server::store::{MemoryEmployeeStore, SharedStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store: SharedStore = Arc::new(MemoryEmployeeStore::new());
//! let cache = Cache::disabled();
//! let pipeline = IngestPipeline::new(store.clone(), cache.clone(), config.ingest.settings());
//! let jobs = JobTracker::new(pipeline.clone(), config.ingest.max_workers);
//!
//! let app = api::create_router(FeatureState { store, cache, pipeline, jobs }, &config);
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod store;
