//! Repository trait for daily aggregate rows.

use crate::domain::entities::DailyStat;
use crate::domain::repositories::click_repository::DayRollup;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Service-wide totals for one day, summed over all links.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub clicks: i64,
    pub unique_visitors: i64,
}

/// Repository interface for the `(link, day)` aggregate table.
///
/// Written exclusively by the analytics aggregator; read by the stats and
/// trends endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregateRepository: Send + Sync {
    /// Inserts or overwrites the aggregate row for `(rollup.link_id, day)`
    /// with the freshly computed totals.
    ///
    /// Idempotent, not additive: upserting the same rollup twice yields the
    /// same stored values.
    async fn upsert_day(&self, day: NaiveDate, rollup: &DayRollup) -> Result<(), AppError>;

    /// Aggregate rows for one link within `[from, to]`, oldest first.
    async fn for_link(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStat>, AppError>;

    /// Per-day totals summed over all links from `from` onward, oldest first.
    async fn trends(&self, from: NaiveDate) -> Result<Vec<TrendPoint>, AppError>;
}
