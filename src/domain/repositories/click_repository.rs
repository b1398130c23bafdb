//! Repository trait for raw click events.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Per-link totals for one calendar day, computed from raw click rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRollup {
    pub link_id: i64,
    pub clicks: i64,
    /// Count of distinct session fingerprints within the day.
    pub unique_visitors: i64,
}

/// One entry of the trailing-window ranking.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankedLink {
    pub code: String,
    pub title: Option<String>,
    pub clicks: i64,
}

/// Grouped click counts for the per-link stats view.
#[derive(Debug, Clone, Default)]
pub struct ClickBreakdown {
    pub by_device: Vec<(String, i64)>,
    pub by_browser: Vec<(String, i64)>,
    /// Top referrers, most frequent first.
    pub top_referrers: Vec<(String, i64)>,
}

/// Repository interface for click persistence and analytics reads.
///
/// The write side is consumed exclusively by the ingestion worker; the read
/// side feeds the aggregator, the ranking refresh, and the stats endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists a click and applies the link counter deltas as one atomic
    /// unit: `clicks += 1`, `unique_clicks += 1` when `is_unique`, and
    /// `last_accessed = now()`.
    ///
    /// Increments are relative deltas applied in the store, never
    /// read-modify-write, so concurrent ingestions never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the referenced link vanished.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, new_click: NewClick, is_unique: bool) -> Result<Click, AppError>;

    /// Whether any click exists for `(link_id, fingerprint)`.
    ///
    /// A lifetime point lookup: "unique visitor" means unique for the link's
    /// entire history, not per day.
    async fn fingerprint_seen(&self, link_id: i64, fingerprint: &str) -> Result<bool, AppError>;

    /// Recent clicks for a link, newest first.
    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError>;

    /// Groups one day's clicks by link: row count plus distinct-fingerprint
    /// count per link. Links with no clicks that day are absent.
    async fn day_rollups(&self, day: NaiveDate) -> Result<Vec<DayRollup>, AppError>;

    /// Deletes clicks older than `cutoff` in bounded batches, returning the
    /// total number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>, batch_size: i64)
        -> Result<u64, AppError>;

    /// Top active links by click volume since `since`, busiest first.
    async fn top_links_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<RankedLink>, AppError>;

    /// Total clicks recorded since `since`, across all links.
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, AppError>;

    /// Device/browser/referrer breakdowns for a link since `since`.
    async fn breakdown(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<ClickBreakdown, AppError>;
}
