//! Key-value cache used for exchange rates.
//!
//! `CACHE_URL` picks the backend by scheme:
//! - `redis://` / `rediss://` - shared Redis, so every server process sees
//!   the same rates
//! - `memory://` - in-process, per server

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Unsupported cache URL '{0}' (expected redis:// or memory://)")]
    UnsupportedUrl(String),

    #[error("Cache backend failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// `None` when the key is missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value`, replacing any previous entry, for `ttl`
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL-aware in-memory cache. Reads run concurrently; an expired entry is
/// simply overwritten by the next `set_ex`.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        let value = entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone());

        debug!(key, hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// Redis-backed cache (`GET` / `SET key value EX ttl`).
///
/// The connection manager reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        info!("Connected to Redis cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;

        debug!(key, hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut connection = self.connection.clone();
        // Redis rejects EX 0
        let seconds = ttl.as_secs().max(1);
        let _: () = connection.set_ex(key, value, seconds).await?;
        Ok(())
    }
}

/// Open the cache named by a connection string
pub async fn connect(url: &str) -> Result<Arc<dyn KeyValueCache>> {
    if url.starts_with("memory://") {
        Ok(Arc::new(MemoryCache::new()))
    } else if url.starts_with("redis://") || url.starts_with("rediss://") {
        Ok(Arc::new(RedisCache::connect(url).await?))
    } else {
        Err(CacheError::UnsupportedUrl(url.to_string()))
    }
}
