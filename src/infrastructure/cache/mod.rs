//! Caching layer for fast redirect lookups and derived data.
//!
//! Provides a [`Cache`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process TTL cache (no-Redis deployments, tests)
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{link_key, qr_key, Cache, CacheError, CacheResult, RANKING_KEY};
