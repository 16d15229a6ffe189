//! Redis cache backend

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use super::{CacheBackend, CacheError};

/// [`CacheBackend`] over a `deadpool-redis` connection pool
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool for `redis_url`. Connections are opened lazily, so this does not
    /// fail when the server is unreachable.
    pub fn from_url(redis_url: &str) -> Result<Self, CacheError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Pool(e.to_string()))
    }

    async fn keys(conn: &mut Connection, prefix: &str) -> Result<Vec<String>, CacheError> {
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{prefix}*"))
            .query_async(conn)
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut conn = self.connection().await?;
        let keys = Self::keys(&mut conn, prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: usize = conn.del(&keys).await?;
        Ok(removed)
    }

    async fn count_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut conn = self.connection().await?;
        Ok(Self::keys(&mut conn, prefix).await?.len())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
