//! Redirect resolution service.
//!
//! The synchronous read path: cache-aside code lookup, live expiry
//! evaluation, and a non-blocking click enqueue. Never mutates a link
//! directly; only the ingestion pipeline touches counters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{link_key, Cache};

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect to the target URL (HTTP 302).
    Redirect(String),
    /// Unknown or inactive code (HTTP 404); the two are indistinguishable
    /// from the client's perspective.
    NotFound,
    /// Known, active, but past its expiry timestamp (HTTP 410).
    Gone,
}

/// Request metadata accompanying a resolution, used for click tracking.
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Cached snapshot of a link, as of cache-insertion time.
///
/// Expiry is stored in the snapshot and re-evaluated on every resolution:
/// a cached entry can turn `Gone` without any store access.
#[derive(Debug, Serialize, Deserialize)]
struct CachedLink {
    id: i64,
    target_url: String,
    expires_at: Option<DateTime<Utc>>,
}

impl From<&Link> for CachedLink {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id,
            target_url: link.target_url.clone(),
            expires_at: link.expires_at,
        }
    }
}

/// Service for resolving short codes to redirect decisions.
pub struct ResolverService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn Cache>,
    click_tx: mpsc::Sender<ClickEvent>,
    cache_ttl: Duration,
}

impl ResolverService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn Cache>,
        click_tx: mpsc::Sender<ClickEvent>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            links,
            cache,
            click_tx,
            cache_ttl,
        }
    }

    /// Resolves `code` to a redirect decision and, on success, enqueues a
    /// click event.
    ///
    /// The enqueue is fire-and-forget: a full queue drops the event and the
    /// redirect still succeeds. Store errors surface as `Err`; `NotFound`
    /// and `Gone` are ordinary outcomes, not errors.
    pub async fn resolve(
        &self,
        code: &str,
        ctx: ClickContext,
    ) -> Result<Resolution, AppError> {
        let key = link_key(code);

        let snapshot = match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<CachedLink>(&bytes) {
                Ok(cached) => {
                    counter!("resolution_cache_hits_total").increment(1);
                    debug!("Cache HIT for {}", code);
                    Some(cached)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry for {}: {}", code, e);
                    let _ = self.cache.invalidate(&key).await;
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Cache error for {}: {}", code, e);
                None
            }
        };

        let snapshot = match snapshot {
            Some(snapshot) => snapshot,
            None => {
                counter!("resolution_cache_misses_total").increment(1);

                let Some(link) = self.links.find_active_by_code(code).await? else {
                    return Ok(Resolution::NotFound);
                };

                let snapshot = CachedLink::from(&link);
                self.populate_cache(&key, &snapshot);
                snapshot
            }
        };

        // Expiry is computed, not stored: evaluate on every resolution, even
        // for entries served from the cache.
        if snapshot.expires_at.is_some_and(|e| Utc::now() >= e) {
            return Ok(Resolution::Gone);
        }

        self.enqueue_click(&snapshot, code, ctx);

        Ok(Resolution::Redirect(snapshot.target_url))
    }

    /// Writes the snapshot to the cache without blocking the response.
    fn populate_cache(&self, key: &str, snapshot: &CachedLink) {
        let Ok(bytes) = serde_json::to_vec(snapshot) else {
            return;
        };

        let cache = self.cache.clone();
        let key = key.to_string();
        let ttl = self.cache_ttl;
        tokio::spawn(async move {
            if let Err(e) = cache.set(&key, &bytes, Some(ttl)).await {
                error!("Failed to cache link snapshot for {}: {}", key, e);
            }
        });
    }

    fn enqueue_click(&self, snapshot: &CachedLink, code: &str, ctx: ClickContext) {
        let event = ClickEvent::new(
            snapshot.id,
            code.to_string(),
            ctx.ip,
            ctx.user_agent.as_deref(),
            ctx.referer.as_deref(),
        );

        if self.click_tx.try_send(event).is_err() {
            counter!("clicks_enqueue_dropped_total").increment(1);
            debug!("Click queue full, dropping event for {}", code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::MemoryCache;
    use chrono::Duration as ChronoDuration;

    fn active_link(id: i64, code: &str, expires_at: Option<DateTime<Utc>>) -> Link {
        let now = Utc::now();
        Link {
            id,
            code: code.to_string(),
            target_url: "https://example.com".to_string(),
            title: None,
            description: None,
            is_active: true,
            expires_at,
            clicks: 0,
            unique_clicks: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn resolver(
        repo: MockLinkRepository,
        cache: Arc<MemoryCache>,
    ) -> (ResolverService, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let service = ResolverService::new(
            Arc::new(repo),
            cache,
            tx,
            Duration::from_secs(3600),
        );
        (service, rx)
    }

    #[tokio::test]
    async fn test_resolve_active_link_redirects_and_enqueues() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .times(1)
            .returning(|_| Ok(Some(active_link(1, "abc123", None))));

        let (service, mut rx) = resolver(repo, Arc::new(MemoryCache::default()));

        let result = service
            .resolve("abc123", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(
            result,
            Resolution::Redirect("https://example.com".to_string())
        );

        let event = rx.try_recv().unwrap();
        assert_eq!(event.link_id, 1);
        assert_eq!(event.code, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let (service, mut rx) = resolver(repo, Arc::new(MemoryCache::default()));

        let result = service
            .resolve("ghost", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(result, Resolution::NotFound);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_expired_link_is_gone_without_click() {
        let mut repo = MockLinkRepository::new();
        let expired = Some(Utc::now() - ChronoDuration::days(1));
        repo.expect_find_active_by_code()
            .times(1)
            .returning(move |_| Ok(Some(active_link(1, "exp1", expired))));

        let (service, mut rx) = resolver(repo, Arc::new(MemoryCache::default()));

        let result = service
            .resolve("exp1", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(result, Resolution::Gone);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_serves_from_cache_without_store() {
        let cache = Arc::new(MemoryCache::default());
        let snapshot = CachedLink {
            id: 7,
            target_url: "https://cached.example.com".to_string(),
            expires_at: None,
        };
        cache
            .set(
                &link_key("warm"),
                &serde_json::to_vec(&snapshot).unwrap(),
                None,
            )
            .await
            .unwrap();

        // No store expectations: a hit must not touch the repository.
        let repo = MockLinkRepository::new();
        let (service, mut rx) = resolver(repo, cache);

        let result = service
            .resolve("warm", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(
            result,
            Resolution::Redirect("https://cached.example.com".to_string())
        );
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_cached_pre_expiry_snapshot_turns_gone() {
        let cache = Arc::new(MemoryCache::default());

        // Snapshot cached while the link was still valid, whose expiry has
        // since passed.
        let snapshot = CachedLink {
            id: 9,
            target_url: "https://example.com".to_string(),
            expires_at: Some(Utc::now() - ChronoDuration::seconds(1)),
        };
        cache
            .set(
                &link_key("stale"),
                &serde_json::to_vec(&snapshot).unwrap(),
                None,
            )
            .await
            .unwrap();

        let repo = MockLinkRepository::new();
        let (service, mut rx) = resolver(repo, cache);

        let result = service
            .resolve("stale", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(result, Resolution::Gone);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_queue_still_redirects() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .times(1)
            .returning(|_| Ok(Some(active_link(1, "busy", None))));

        let (tx, mut rx) = mpsc::channel(1);
        tx.try_send(ClickEvent::new(99, "filler".to_string(), None, None, None))
            .unwrap();

        let service = ResolverService::new(
            Arc::new(repo),
            Arc::new(MemoryCache::default()),
            tx,
            Duration::from_secs(3600),
        );

        let result = service
            .resolve("busy", ClickContext::default())
            .await
            .unwrap();

        assert!(matches!(result, Resolution::Redirect(_)));

        // Only the filler event is in the queue; the new one was dropped.
        assert_eq!(rx.try_recv().unwrap().code, "filler");
        assert!(rx.try_recv().is_err());
    }
}
