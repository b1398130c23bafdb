//! In-process cache implementation with TTL semantics.

use super::service::{Cache, CacheResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// A process-local TTL cache.
///
/// Used when Redis is not configured, and by tests. Expired entries are
/// dropped lazily on read. Time can be advanced artificially in tests to
/// exercise TTL expiry without sleeping.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: Duration,
    /// Artificial clock offset in milliseconds, added to `Instant::now()`.
    skew_ms: AtomicU64,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            skew_ms: AtomicU64::new(0),
        }
    }

    /// Advances the cache's notion of "now" by `delta`.
    ///
    /// Test hook: lets TTL expiry be observed without real waiting.
    pub fn advance(&self, delta: Duration) {
        self.skew_ms
            .fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }

    fn now(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.skew_ms.load(Ordering::SeqCst))
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = self.now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: self.now() + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let cache = MemoryCache::default();
        cache.set("k", b"value", None).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = MemoryCache::default();
        assert_eq!(cache.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryCache::default();
        cache.set("k", b"value", None).await.unwrap();
        cache.invalidate("k").await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::default();
        cache
            .set("k", b"value", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        cache.advance(Duration::from_secs(30));
        assert!(cache.get("k").await.unwrap().is_some());

        cache.advance(Duration::from_secs(31));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_ttl() {
        let cache = MemoryCache::default();
        cache
            .set("k", b"old", Some(Duration::from_secs(10)))
            .await
            .unwrap();

        cache.advance(Duration::from_secs(8));
        cache
            .set("k", b"new", Some(Duration::from_secs(10)))
            .await
            .unwrap();

        cache.advance(Duration::from_secs(8));
        assert_eq!(cache.get("k").await.unwrap(), Some(b"new".to_vec()));
    }
}
