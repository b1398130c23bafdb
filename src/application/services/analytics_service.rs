//! Analytics aggregation, retention, and ranking jobs.
//!
//! Every operation here is idempotent and re-entrant: invocations are
//! triggered by the scheduler or the admin CLI and are always safe to re-run,
//! including concurrently with in-flight ingestion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use serde_json::json;
use tracing::{error, info};

use crate::domain::repositories::{
    AggregateRepository, ClickRepository, LinkRepository, RankedLink,
};
use crate::error::AppError;
use crate::infrastructure::cache::{Cache, RANKING_KEY};

/// Rows removed per retention delete batch.
const RETENTION_BATCH_SIZE: i64 = 10_000;

/// Tuning knobs for the analytics jobs.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Raw click rows older than this are removed by the retention sweep.
    pub retention_days: u32,
    /// Trailing window of the ranking refresh.
    pub ranking_window_days: u32,
    /// Number of entries in the ranking.
    pub ranking_limit: i64,
    /// TTL of the cached ranking payload.
    pub ranking_ttl: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            retention_days: 90,
            ranking_window_days: 7,
            ranking_limit: 100,
            ranking_ttl: Duration::from_secs(1800),
        }
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    pub links_processed: u64,
    pub failures: u64,
}

/// Service exposing the scheduled analytics operations.
pub struct AnalyticsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    aggregates: Arc<dyn AggregateRepository>,
    cache: Arc<dyn Cache>,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        aggregates: Arc<dyn AggregateRepository>,
        cache: Arc<dyn Cache>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            links,
            clicks,
            aggregates,
            cache,
            config,
        }
    }

    /// Recomputes daily aggregates for every link with at least one click on
    /// `day`.
    ///
    /// Click count = raw row count; unique visitors = distinct fingerprints.
    /// Each `(link, day)` row is overwritten with the fresh totals, so the
    /// operation is idempotent. A failing link is counted and skipped; it
    /// never blocks the rest of the day.
    pub async fn aggregate_day(&self, day: NaiveDate) -> Result<AggregationReport, AppError> {
        let rollups = self.clicks.day_rollups(day).await?;
        let mut report = AggregationReport::default();

        for rollup in &rollups {
            match self.aggregates.upsert_day(day, rollup).await {
                Ok(()) => report.links_processed += 1,
                Err(e) => {
                    report.failures += 1;
                    error!(
                        "Failed to upsert daily aggregate for link {} on {}: {}",
                        rollup.link_id, day, e
                    );
                }
            }
        }

        counter!("aggregation_runs_total").increment(1);
        info!(
            "Aggregated analytics for {} links on {} ({} failures)",
            report.links_processed, day, report.failures
        );

        Ok(report)
    }

    /// Aggregates yesterday relative to the current UTC date, the shape the
    /// hourly schedule uses. Late-arriving events from "today" simply don't
    /// exist yet and are picked up by tomorrow's runs.
    pub async fn aggregate_yesterday(&self) -> Result<AggregationReport, AppError> {
        let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
        self.aggregate_day(yesterday).await
    }

    /// Deletes raw click rows older than the configured horizon.
    ///
    /// Must only run after aggregation for those dates has completed, since
    /// aggregation reads raw rows; the daily schedule guarantees that by
    /// construction (the horizon is days, aggregation lag is hours).
    pub async fn sweep_retention(&self) -> Result<u64, AppError> {
        let cutoff = Utc::now() - chrono::Duration::days(self.config.retention_days as i64);
        let deleted = self
            .clicks
            .delete_older_than(cutoff, RETENTION_BATCH_SIZE)
            .await?;

        info!("Deleted {} old click records", deleted);
        Ok(deleted)
    }

    /// Flips `is_active = false` on links whose expiry has passed.
    ///
    /// Purely an optimization for listing/counting consistency; resolution
    /// re-checks expiry live and never needs this write.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let swept = self.links.sweep_expired(Utc::now()).await?;
        if swept > 0 {
            info!("Deactivated {} expired links", swept);
        }
        Ok(swept)
    }

    /// Rebuilds the trailing-window ranking wholesale and caches it.
    pub async fn refresh_ranking(&self) -> Result<Vec<RankedLink>, AppError> {
        let since = Utc::now() - chrono::Duration::days(self.config.ranking_window_days as i64);
        let ranking = self
            .clicks
            .top_links_since(since, self.config.ranking_limit)
            .await?;

        let payload = serde_json::to_vec(&ranking).map_err(|e| {
            AppError::internal(
                "Failed to serialize ranking",
                json!({ "reason": e.to_string() }),
            )
        })?;

        let _ = self
            .cache
            .set(RANKING_KEY, &payload, Some(self.config.ranking_ttl))
            .await;

        info!("Updated ranking for {} links", ranking.len());
        Ok(ranking)
    }

    /// Returns the cached ranking, recomputing on a miss.
    pub async fn ranking(&self) -> Result<Vec<RankedLink>, AppError> {
        if let Ok(Some(bytes)) = self.cache.get(RANKING_KEY).await {
            if let Ok(ranking) = serde_json::from_slice::<Vec<RankedLink>>(&bytes) {
                return Ok(ranking);
            }
        }

        self.refresh_ranking().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        DayRollup, MockAggregateRepository, MockClickRepository, MockLinkRepository,
    };
    use crate::infrastructure::cache::MemoryCache;

    fn service(
        links: MockLinkRepository,
        clicks: MockClickRepository,
        aggregates: MockAggregateRepository,
        cache: Arc<MemoryCache>,
    ) -> AnalyticsService {
        AnalyticsService::new(
            Arc::new(links),
            Arc::new(clicks),
            Arc::new(aggregates),
            cache,
            AnalyticsConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_aggregate_day_upserts_each_rollup() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let mut clicks = MockClickRepository::new();
        clicks.expect_day_rollups().times(1).returning(|_| {
            Ok(vec![
                DayRollup {
                    link_id: 1,
                    clicks: 10,
                    unique_visitors: 7,
                },
                DayRollup {
                    link_id: 2,
                    clicks: 3,
                    unique_visitors: 3,
                },
            ])
        });

        let mut aggregates = MockAggregateRepository::new();
        aggregates
            .expect_upsert_day()
            .times(2)
            .returning(|_, _| Ok(()));

        let report = service(
            MockLinkRepository::new(),
            clicks,
            aggregates,
            Arc::new(MemoryCache::default()),
        )
        .aggregate_day(day)
        .await
        .unwrap();

        assert_eq!(report.links_processed, 2);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn test_aggregate_day_failure_does_not_block_others() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let mut clicks = MockClickRepository::new();
        clicks.expect_day_rollups().times(1).returning(|_| {
            Ok(vec![
                DayRollup {
                    link_id: 1,
                    clicks: 1,
                    unique_visitors: 1,
                },
                DayRollup {
                    link_id: 2,
                    clicks: 2,
                    unique_visitors: 2,
                },
            ])
        });

        let mut aggregates = MockAggregateRepository::new();
        let mut calls = 0;
        aggregates.expect_upsert_day().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(())
            }
        });

        let report = service(
            MockLinkRepository::new(),
            clicks,
            aggregates,
            Arc::new(MemoryCache::default()),
        )
        .aggregate_day(day)
        .await
        .unwrap();

        assert_eq!(report.links_processed, 1);
        assert_eq!(report.failures, 1);
    }

    #[tokio::test]
    async fn test_refresh_ranking_caches_payload() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_top_links_since().times(1).returning(|_, _| {
            Ok(vec![RankedLink {
                code: "abc123".to_string(),
                title: Some("Example".to_string()),
                clicks: 42,
            }])
        });

        let cache = Arc::new(MemoryCache::default());
        let analytics = service(
            MockLinkRepository::new(),
            clicks,
            MockAggregateRepository::new(),
            cache.clone(),
        );

        let ranking = analytics.refresh_ranking().await.unwrap();
        assert_eq!(ranking.len(), 1);

        let cached = cache.get(RANKING_KEY).await.unwrap().unwrap();
        let decoded: Vec<RankedLink> = serde_json::from_slice(&cached).unwrap();
        assert_eq!(decoded[0].code, "abc123");
        assert_eq!(decoded[0].clicks, 42);
    }

    #[tokio::test]
    async fn test_ranking_serves_cached_without_recompute() {
        let cache = Arc::new(MemoryCache::default());
        let payload = serde_json::to_vec(&vec![RankedLink {
            code: "warm".to_string(),
            title: None,
            clicks: 7,
        }])
        .unwrap();
        cache.set(RANKING_KEY, &payload, None).await.unwrap();

        // No expectations: a warm cache must not touch the store.
        let analytics = service(
            MockLinkRepository::new(),
            MockClickRepository::new(),
            MockAggregateRepository::new(),
            cache,
        );

        let ranking = analytics.ranking().await.unwrap();
        assert_eq!(ranking[0].code, "warm");
    }

    #[tokio::test]
    async fn test_sweep_expired_reports_count() {
        let mut links = MockLinkRepository::new();
        links.expect_sweep_expired().times(1).returning(|_| Ok(3));

        let analytics = service(
            links,
            MockClickRepository::new(),
            MockAggregateRepository::new(),
            Arc::new(MemoryCache::default()),
        );

        assert_eq!(analytics.sweep_expired().await.unwrap(), 3);
    }
}
