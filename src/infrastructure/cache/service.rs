//! Cache trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Shared key-value cache with TTL semantics and explicit invalidation.
///
/// Values are opaque bytes: the resolver stores JSON link snapshots, the QR
/// service stores PNG bodies, and the ranking job stores a JSON array.
/// The cache is injected into components, never reached as ambient state.
///
/// Implementations must be thread-safe and fail open: a cache error degrades
/// to a store lookup, it never disrupts the request flow.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process TTL map
/// - [`crate::infrastructure::cache::NullCache`] - no-op for disabled caching
#[async_trait]
pub trait Cache: Send + Sync {
    /// Retrieves the value for `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` on hit
    /// - `Ok(None)` on miss or error (fail-open behavior)
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value` under `key` with an optional TTL.
    ///
    /// `ttl = None` applies the implementation's default TTL. Errors are
    /// logged and swallowed so callers never fail on a cache write.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes `key`.
    ///
    /// Used by writers to invalidate a cached entry when the underlying
    /// record is mutated or soft-deleted.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Whether the cache backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Cache key for a resolution snapshot.
pub fn link_key(code: &str) -> String {
    format!("link:{code}")
}

/// Cache key for a rendered QR code.
pub fn qr_key(code: &str) -> String {
    format!("qr:{code}")
}

/// Well-known key for the trailing-window ranking. The window parameter is
/// baked into the refresh job, not the key.
pub const RANKING_KEY: &str = "ranking:weekly";
