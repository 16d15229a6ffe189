//! Process-local cache backend

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{CacheBackend, CacheError};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// [`CacheBackend`] holding entries in a map; expired entries read as absent
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let mut live_removed = 0;
        entries.retain(|key, entry| {
            let keep = !key.starts_with(prefix);
            if !keep && entry.is_live(now) {
                live_removed += 1;
            }
            keep
        });
        tracing::trace!(dropped = before - entries.len(), "Pruned memory cache");
        Ok(live_removed)
    }

    async fn count_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && entry.is_live(now))
            .count())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = MemoryCache::new();
        cache
            .set("employee:1", "{}".to_string(), Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(cache.get("employee:1").await.unwrap().as_deref(), Some("{}"));

        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(cache.get("employee:1").await.unwrap().is_none());
        assert_eq!(cache.count_prefix("employee:").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("employee:1", "a".to_string(), ttl).await.unwrap();
        cache.set("employee:2", "b".to_string(), ttl).await.unwrap();
        cache.set("employee_list:all:limit:20:offset:0", "c".to_string(), ttl).await.unwrap();

        assert_eq!(cache.delete_prefix("employee:").await.unwrap(), 2);
        assert_eq!(cache.count_prefix("employee_list:").await.unwrap(), 1);
        assert!(cache.get("employee:2").await.unwrap().is_none());
    }
}
