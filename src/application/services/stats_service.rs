//! Click statistics and reporting service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use crate::domain::entities::{DailyStat, Link};
use crate::domain::repositories::{
    AggregateRepository, ClickBreakdown, ClickRepository, LinkOrder, LinkQuery, LinkRepository,
    TrendPoint,
};
use crate::error::AppError;

/// Trailing window (days) for the per-link stats view.
const STATS_WINDOW_DAYS: i64 = 30;

/// Detailed statistics for one link.
#[derive(Debug, Clone)]
pub struct LinkStatsReport {
    pub link: Link,
    pub clicks_by_day: Vec<DailyStat>,
    pub breakdown: ClickBreakdown,
}

/// Service-wide dashboard figures.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub total_links: i64,
    pub total_clicks: i64,
    pub total_unique_visitors: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
    pub top_links: Vec<Link>,
}

/// Service for statistics reads across links, clicks, and aggregates.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    aggregates: Arc<dyn AggregateRepository>,
}

impl StatsService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        aggregates: Arc<dyn AggregateRepository>,
    ) -> Self {
        Self {
            links,
            clicks,
            aggregates,
        }
    }

    /// Detailed stats for one link over the trailing 30 days.
    ///
    /// Totals come from the link's own counters; the day series comes from
    /// the daily aggregates; device/browser/referrer breakdowns come from
    /// raw click rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn link_stats(&self, code: &str) -> Result<LinkStatsReport, AppError> {
        let link = self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        let now = Utc::now();
        let since = now - Duration::days(STATS_WINDOW_DAYS);
        let from = since.date_naive();
        let to = now.date_naive();

        let clicks_by_day = self.aggregates.for_link(link.id, from, to).await?;
        let breakdown = self.clicks.breakdown(link.id, since).await?;

        Ok(LinkStatsReport {
            link,
            clicks_by_day,
            breakdown,
        })
    }

    /// Overall dashboard statistics.
    pub async fn dashboard(&self) -> Result<DashboardReport, AppError> {
        let totals = self.links.totals().await?;

        let now = Utc::now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists")
            .and_utc();
        let week_ago = now - Duration::days(7);

        let clicks_today = self.clicks.count_since(today_start).await?;
        let clicks_this_week = self.clicks.count_since(week_ago).await?;

        let top_links = self
            .links
            .list(LinkQuery::new(1, 5).with_order(LinkOrder::ClicksDesc))
            .await?;

        Ok(DashboardReport {
            total_links: totals.active_links,
            total_clicks: totals.total_clicks,
            total_unique_visitors: totals.total_unique_visitors,
            clicks_today,
            clicks_this_week,
            top_links,
        })
    }

    /// Per-day totals over the trailing `days`, summed over all links.
    pub async fn trends(&self, days: i64) -> Result<Vec<TrendPoint>, AppError> {
        let from = Utc::now().date_naive() - Duration::days(days);
        self.aggregates.trends(from).await
    }
}
