//! Read-through cache in front of the employee store
//!
//! The [`Cache`] facade is what the API features talk to. It serializes records and
//! list pages as JSON and delegates to a [`CacheBackend`]:
//!
//! - [`RedisCache`]: Redis via a `deadpool-redis` connection pool
//! - [`MemoryCache`]: process-local map with expiry, used by tests
//! - [`NoopCache`]: caching disabled
//!
//! Every facade call is best-effort. A backend failure is logged at `warn` and then
//! behaves like a miss (reads) or a no-op (writes), so the cache can never fail a
//! request.
//!
//! # Key scheme
//!
//! - `employee:{id}` -> JSON [`Employee`]
//! - `employee_list:all:limit:{l}:offset:{o}` -> JSON [`EmployeePage`]
//! - `employee_list:search:{q}:limit:{l}:offset:{o}` -> JSON [`EmployeePage`]

pub mod memory;
pub mod redis;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Employee;
use crate::store::EmployeePage;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

pub const EMPLOYEE_KEY_PREFIX: &str = "employee:";
pub const LIST_KEY_PREFIX: &str = "employee_list:";

pub fn employee_key(id: i64) -> String {
    format!("{EMPLOYEE_KEY_PREFIX}{id}")
}

/// Key for one page of the plain list or of a search
pub fn list_key(limit: i64, offset: i64, search: Option<&str>) -> String {
    match search {
        Some(query) => format!("{LIST_KEY_PREFIX}search:{query}:limit:{limit}:offset:{offset}"),
        None => format!("{LIST_KEY_PREFIX}all:limit:{limit}:offset:{offset}"),
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache pool error: {0}")]
    Pool(String),

    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name reported by health checks
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    async fn count_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Backend used when caching is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheBackend for NoopCache {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Ok(0)
    }

    async fn count_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Ok(0)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Snapshot of cache usage reported by `/api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub backend: String,
    pub hits: u64,
    pub misses: u64,
    pub employee_keys: usize,
    pub list_keys: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Best-effort cache facade
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.backend.name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCache), Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn employee(&self, id: i64) -> Option<Employee> {
        self.read(&employee_key(id)).await
    }

    pub async fn put_employee(&self, employee: &Employee) {
        self.write(&employee_key(employee.id), employee).await;
    }

    pub async fn forget_employee(&self, id: i64) {
        let key = employee_key(id);
        if let Err(e) = self.backend.delete(&key).await {
            tracing::warn!(error = %e, key = %key, "Cache delete failed");
        }
    }

    pub async fn employee_page(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Option<EmployeePage> {
        self.read(&list_key(limit, offset, search)).await
    }

    pub async fn put_employee_page(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
        page: &EmployeePage,
    ) {
        self.write(&list_key(limit, offset, search), page).await;
    }

    /// Drop every cached list page.
    pub async fn invalidate_lists(&self) {
        match self.backend.delete_prefix(LIST_KEY_PREFIX).await {
            Ok(removed) => tracing::debug!(removed, "Invalidated cached employee lists"),
            Err(e) => tracing::warn!(error = %e, "Cache list invalidation failed"),
        }
    }

    /// Drop every cached record and list page.
    pub async fn invalidate_all(&self) {
        for prefix in [EMPLOYEE_KEY_PREFIX, LIST_KEY_PREFIX] {
            match self.backend.delete_prefix(prefix).await {
                Ok(removed) => tracing::debug!(prefix, removed, "Invalidated cache namespace"),
                Err(e) => tracing::warn!(error = %e, prefix, "Cache invalidation failed"),
            }
        }
    }

    /// Backend reachability, propagated for the health check
    pub async fn health(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }

    pub async fn stats(&self) -> CacheStats {
        let count = |prefix: &'static str| async move {
            self.backend.count_prefix(prefix).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, prefix, "Cache key count failed");
                0
            })
        };

        CacheStats {
            backend: self.backend.name().to_string(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            employee_keys: count(EMPLOYEE_KEY_PREFIX).await,
            list_keys: count(LIST_KEY_PREFIX).await,
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, key, "Cache read failed");
                None
            },
        };

        let value = raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, key, "Discarding undecodable cache entry");
                None
            },
        });

        let counter = if value.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        value
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let result = match serde_json::to_string(value) {
            Ok(json) => self.backend.set(key, json, self.ttl).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, key, "Cache write failed");
        }
    }
}
