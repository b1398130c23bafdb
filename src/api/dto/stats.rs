//! Response bodies for the statistics endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::application::services::{DashboardReport, LinkStatsReport};
use crate::domain::repositories::{RankedLink, TrendPoint};

/// One point of the per-link day series.
#[derive(Debug, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub clicks: i64,
    pub unique_visitors: i64,
}

/// One referrer entry, most frequent first.
#[derive(Debug, Serialize)]
pub struct ReferrerCount {
    pub referer: String,
    pub count: i64,
}

/// Response of `GET /api/links/{code}/stats`.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    pub code: String,
    pub total_clicks: i64,
    pub unique_clicks: i64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub clicks_by_day: Vec<DayCount>,
    pub clicks_by_device: BTreeMap<String, i64>,
    pub clicks_by_browser: BTreeMap<String, i64>,
    pub top_referrers: Vec<ReferrerCount>,
}

impl From<LinkStatsReport> for LinkStatsResponse {
    fn from(report: LinkStatsReport) -> Self {
        Self {
            code: report.link.code.clone(),
            total_clicks: report.link.clicks,
            unique_clicks: report.link.unique_clicks,
            last_accessed: report.link.last_accessed,
            clicks_by_day: report
                .clicks_by_day
                .into_iter()
                .map(|s| DayCount {
                    day: s.day,
                    clicks: s.clicks,
                    unique_visitors: s.unique_visitors,
                })
                .collect(),
            clicks_by_device: report.breakdown.by_device.into_iter().collect(),
            clicks_by_browser: report.breakdown.by_browser.into_iter().collect(),
            top_referrers: report
                .breakdown
                .top_referrers
                .into_iter()
                .map(|(referer, count)| ReferrerCount { referer, count })
                .collect(),
        }
    }
}

/// Entry of the dashboard's top-links list.
#[derive(Debug, Serialize)]
pub struct TopLinkEntry {
    pub code: String,
    pub target_url: String,
    pub title: Option<String>,
    pub clicks: i64,
}

/// Response of `GET /api/stats/dashboard`.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub total_unique_visitors: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
    pub top_links: Vec<TopLinkEntry>,
}

impl From<DashboardReport> for DashboardResponse {
    fn from(report: DashboardReport) -> Self {
        Self {
            total_links: report.total_links,
            total_clicks: report.total_clicks,
            total_unique_visitors: report.total_unique_visitors,
            clicks_today: report.clicks_today,
            clicks_this_week: report.clicks_this_week,
            top_links: report
                .top_links
                .into_iter()
                .map(|l| TopLinkEntry {
                    code: l.code,
                    target_url: l.target_url,
                    title: l.title,
                    clicks: l.clicks,
                })
                .collect(),
        }
    }
}

/// Response of `GET /api/stats/trends`.
#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub period_days: i64,
    pub trends: Vec<TrendPoint>,
}

/// Response of `GET /api/ranking`.
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub entries: Vec<RankedLink>,
}
