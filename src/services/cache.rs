use async_trait::async_trait;
use moka::Expiry;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::CacheEntry;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Key-value store for finished responses.
///
/// Implementations must be safe for concurrent use. Writes are last-write-wins
/// and nothing ties a lookup to a later store.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store an entry. A zero TTL stores nothing.
    async fn store(&self, key: &str, entry: &CacheEntry, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    entry: CacheEntry,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with
struct EntryTtl;

impl Expiry<String, Arc<StoredEntry>> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<StoredEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<StoredEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka
#[derive(Clone)]
pub struct MemoryCache {
    cache: moka::future::Cache<String, Arc<StoredEntry>>,
}

impl MemoryCache {
    pub fn new(capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.cache.get(key).await.map(|stored| stored.entry.clone()))
    }

    async fn store(&self, key: &str, entry: &CacheEntry, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Ok(());
        }

        let stored = Arc::new(StoredEntry {
            entry: entry.clone(),
            ttl,
        });
        self.cache.insert(key.to_string(), stored).await;
        Ok(())
    }
}

/// Shared cache in Redis. Entries are JSON strings written with `SETEX`.
#[derive(Clone)]
pub struct RedisCache {
    redis: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self { redis })
    }

    /// Look up an entry together with its remaining time to live
    pub async fn lookup_with_ttl(
        &self,
        key: &str,
    ) -> Result<Option<(CacheEntry, Option<Duration>)>, CacheError> {
        let mut conn = self.redis.clone();
        let (value, ttl): (Option<String>, i64) = redis::pipe()
            .cmd("GET")
            .arg(key)
            .cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await?;

        let Some(json) = value else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&json)?;
        // TTL is -1 for keys without expiry and -2 for keys that just vanished
        let remaining = u64::try_from(ttl).ok().map(Duration::from_secs);
        Ok(Some((entry, remaining)))
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.lookup_with_ttl(key).await?.map(|(entry, _)| entry))
    }

    async fn store(&self, key: &str, entry: &CacheEntry, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Ok(());
        }

        let json = serde_json::to_string(entry)?;
        let mut conn = self.redis.clone();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl.as_secs().max(1))
            .arg(json)
            .query_async(&mut conn)
            .await?;

        tracing::trace!("Redis cache set: {}", key);
        Ok(())
    }
}

/// Multi-tier cache
///
/// L1 is the in-process moka cache, L2 is Redis shared across instances.
/// L2 hits are copied into L1 for their remaining lifetime.
#[derive(Clone)]
pub struct TieredCache {
    l1: MemoryCache,
    l2: RedisCache,
}

impl TieredCache {
    pub fn new(l1: MemoryCache, l2: RedisCache) -> Self {
        Self { l1, l2 }
    }
}

#[async_trait]
impl ResponseCache for TieredCache {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        if let Some(entry) = self.l1.lookup(key).await? {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(entry));
        }

        match self.l2.lookup_with_ttl(key).await? {
            Some((entry, remaining)) => {
                tracing::trace!("L2 cache hit: {}", key);
                if let Some(ttl) = remaining {
                    self.l1.store(key, &entry, ttl).await?;
                }
                Ok(Some(entry))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    async fn store(&self, key: &str, entry: &CacheEntry, ttl: Duration) -> Result<(), CacheError> {
        self.l1.store(key, entry, ttl).await?;
        self.l2.store(key, entry, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(body: &str) -> CacheEntry {
        CacheEntry {
            status: 200,
            headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_memory_cache_store_lookup() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(100);
            assert!(cache.lookup("search:spring").await.unwrap().is_none());

            cache
                .store("search:spring", &entry(r#"{"results":[]}"#), Duration::from_secs(60))
                .await
                .unwrap();

            let hit = cache.lookup("search:spring").await.unwrap();
            assert_eq!(hit, Some(entry(r#"{"results":[]}"#)));
        });
    }

    #[test]
    fn test_memory_cache_last_write_wins() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(100);
            cache.store("k", &entry("first"), Duration::from_secs(60)).await.unwrap();
            cache.store("k", &entry("second"), Duration::from_secs(60)).await.unwrap();
            assert_eq!(cache.lookup("k").await.unwrap().unwrap().body, "second");
        });
    }

    #[test]
    fn test_zero_ttl_is_not_stored() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(100);
            cache.store("k", &entry("x"), Duration::ZERO).await.unwrap();
            assert!(cache.lookup("k").await.unwrap().is_none());
        });
    }

    #[tokio::test]
    async fn test_memory_cache_expires() {
        let cache = MemoryCache::new(100);
        cache.store("k", &entry("x"), Duration::from_millis(50)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.lookup("k").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_redis_cache_set_get() {
        let cache = RedisCache::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to create cache");

        cache
            .store("test:search:spring", &entry("value"), Duration::from_secs(60))
            .await
            .unwrap();

        let (hit, ttl) = cache.lookup_with_ttl("test:search:spring").await.unwrap().unwrap();
        assert_eq!(hit.body, "value");
        assert!(ttl.unwrap() <= Duration::from_secs(60));
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_tiered_cache_backfills_l1_from_redis() {
        let l2 = RedisCache::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to create cache");
        l2.store("test:search:backfill", &entry("shared"), Duration::from_secs(60))
            .await
            .unwrap();

        let l1 = MemoryCache::new(100);
        let tiered = TieredCache::new(l1.clone(), l2);
        assert!(l1.lookup("test:search:backfill").await.unwrap().is_none());

        let hit = tiered.lookup("test:search:backfill").await.unwrap();
        assert_eq!(hit.unwrap().body, "shared");

        let local = l1.lookup("test:search:backfill").await.unwrap();
        assert_eq!(local.unwrap().body, "shared");
    }
}
