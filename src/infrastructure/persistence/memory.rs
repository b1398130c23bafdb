//! In-memory store implementing all repository traits.
//!
//! Backs integration tests and cache-less development runs. A single mutex
//! guards the whole dataset, so counter updates have the same atomicity as
//! the PostgreSQL transaction they mirror.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::entities::{Click, DailyStat, Link, LinkPatch, NewClick, NewLink};
use crate::domain::repositories::{
    AggregateRepository, ClickBreakdown, ClickRepository, DayRollup, LinkOrder, LinkQuery,
    LinkRepository, LinkTotals, RankedLink, TrendPoint,
};
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    links: HashMap<i64, Link>,
    code_index: HashMap<String, i64>,
    clicks: Vec<Click>,
    stats: HashMap<(i64, NaiveDate), DailyStat>,
    next_link_id: i64,
    next_click_id: i64,
}

/// An in-memory implementation of every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

fn matches_search(link: &Link, search: &str) -> bool {
    let needle = search.to_lowercase();
    link.code.to_lowercase().contains(&needle)
        || link.target_url.to_lowercase().contains(&needle)
        || link
            .title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&needle))
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.lock();

        if inner.code_index.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_code_key" }),
            ));
        }

        inner.next_link_id += 1;
        let id = inner.next_link_id;
        let now = Utc::now();

        let link = Link {
            id,
            code: new_link.code.clone(),
            target_url: new_link.target_url,
            title: new_link.title,
            description: new_link.description,
            is_active: true,
            expires_at: new_link.expires_at,
            clicks: 0,
            unique_clicks: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
        };

        inner.code_index.insert(new_link.code, id);
        inner.links.insert(id, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let inner = self.lock();
        Ok(inner
            .code_index
            .get(code)
            .and_then(|id| inner.links.get(id))
            .cloned())
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let inner = self.lock();
        Ok(inner
            .code_index
            .get(code)
            .and_then(|id| inner.links.get(id))
            .filter(|l| l.is_active)
            .cloned())
    }

    async fn list(&self, query: LinkQuery) -> Result<Vec<Link>, AppError> {
        let inner = self.lock();

        let mut links: Vec<Link> = inner
            .links
            .values()
            .filter(|l| !query.active_only || l.is_active)
            .filter(|l| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|s| matches_search(l, s))
            })
            .cloned()
            .collect();

        match query.order {
            LinkOrder::CreatedAtDesc => links.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            LinkOrder::CreatedAtAsc => links.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            LinkOrder::ClicksDesc => links.sort_by(|a, b| b.clicks.cmp(&a.clicks)),
            LinkOrder::ClicksAsc => links.sort_by(|a, b| a.clicks.cmp(&b.clicks)),
        }

        let offset = ((query.page - 1).max(0) * query.page_size) as usize;
        Ok(links
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .collect())
    }

    async fn count(&self, search: Option<String>, active_only: bool) -> Result<i64, AppError> {
        let inner = self.lock();
        Ok(inner
            .links
            .values()
            .filter(|l| !active_only || l.is_active)
            .filter(|l| {
                search
                    .as_deref()
                    .is_none_or(|s| matches_search(l, s))
            })
            .count() as i64)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let mut inner = self.lock();

        let id = *inner.code_index.get(code).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        let link = inner.links.get_mut(&id).expect("index points at link");

        if let Some(target_url) = patch.target_url {
            link.target_url = target_url;
        }
        if let Some(title) = patch.title {
            link.title = title;
        }
        if let Some(description) = patch.description {
            link.description = description;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(is_active) = patch.is_active {
            link.is_active = is_active;
        }
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn deactivate(&self, code: &str) -> Result<bool, AppError> {
        let mut inner = self.lock();

        let Some(id) = inner.code_index.get(code).copied() else {
            return Ok(false);
        };

        let link = inner.links.get_mut(&id).expect("index points at link");
        if !link.is_active {
            return Ok(false);
        }

        link.is_active = false;
        link.updated_at = Utc::now();
        Ok(true)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.lock();
        let mut swept = 0u64;

        for link in inner.links.values_mut() {
            if link.is_active && link.expires_at.is_some_and(|e| e < now) {
                link.is_active = false;
                link.updated_at = now;
                swept += 1;
            }
        }

        Ok(swept)
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        let inner = self.lock();
        let mut totals = LinkTotals::default();

        for link in inner.links.values().filter(|l| l.is_active) {
            totals.active_links += 1;
            totals.total_clicks += link.clicks;
            totals.total_unique_visitors += link.unique_clicks;
        }

        Ok(totals)
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick, is_unique: bool) -> Result<Click, AppError> {
        let mut inner = self.lock();

        if !inner.links.contains_key(&new_click.link_id) {
            return Err(AppError::not_found(
                "Link vanished before click could be recorded",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        inner.next_click_id += 1;
        let click = Click {
            id: inner.next_click_id,
            link_id: new_click.link_id,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            device_type: new_click.device_type,
            browser: new_click.browser,
            os: new_click.os,
            fingerprint: new_click.fingerprint,
            clicked_at: Utc::now(),
        };

        inner.clicks.push(click.clone());

        let link = inner
            .links
            .get_mut(&click.link_id)
            .expect("presence checked above");
        link.clicks += 1;
        if is_unique {
            link.unique_clicks += 1;
        }
        link.last_accessed = Some(click.clicked_at);
        link.updated_at = click.clicked_at;

        Ok(click)
    }

    async fn fingerprint_seen(&self, link_id: i64, fingerprint: &str) -> Result<bool, AppError> {
        let inner = self.lock();
        Ok(inner
            .clicks
            .iter()
            .any(|c| c.link_id == link_id && c.fingerprint == fingerprint))
    }

    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let inner = self.lock();
        let mut clicks: Vec<Click> = inner
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        clicks.truncate(limit as usize);
        Ok(clicks)
    }

    async fn day_rollups(&self, day: NaiveDate) -> Result<Vec<DayRollup>, AppError> {
        let inner = self.lock();

        let mut per_link: HashMap<i64, (i64, std::collections::HashSet<&str>)> = HashMap::new();
        for click in inner
            .clicks
            .iter()
            .filter(|c| c.clicked_at.date_naive() == day)
        {
            let entry = per_link.entry(click.link_id).or_default();
            entry.0 += 1;
            entry.1.insert(click.fingerprint.as_str());
        }

        Ok(per_link
            .into_iter()
            .map(|(link_id, (clicks, fingerprints))| DayRollup {
                link_id,
                clicks,
                unique_visitors: fingerprints.len() as i64,
            })
            .collect())
    }

    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        _batch_size: i64,
    ) -> Result<u64, AppError> {
        let mut inner = self.lock();
        let before = inner.clicks.len();
        inner.clicks.retain(|c| c.clicked_at >= cutoff);
        Ok((before - inner.clicks.len()) as u64)
    }

    async fn top_links_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<RankedLink>, AppError> {
        let inner = self.lock();

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for click in inner.clicks.iter().filter(|c| c.clicked_at >= since) {
            *counts.entry(click.link_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<RankedLink> = counts
            .into_iter()
            .filter_map(|(link_id, clicks)| {
                inner
                    .links
                    .get(&link_id)
                    .filter(|l| l.is_active)
                    .map(|l| RankedLink {
                        code: l.code.clone(),
                        title: l.title.clone(),
                        clicks,
                    })
            })
            .collect();

        ranked.sort_by(|a, b| b.clicks.cmp(&a.clicks));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, AppError> {
        let inner = self.lock();
        Ok(inner.clicks.iter().filter(|c| c.clicked_at >= since).count() as i64)
    }

    async fn breakdown(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<ClickBreakdown, AppError> {
        let inner = self.lock();

        let mut devices: HashMap<String, i64> = HashMap::new();
        let mut browsers: HashMap<String, i64> = HashMap::new();
        let mut referrers: HashMap<String, i64> = HashMap::new();

        for click in inner
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id && c.clicked_at >= since)
        {
            if let Some(device) = &click.device_type {
                *devices.entry(device.clone()).or_insert(0) += 1;
            }
            if let Some(browser) = &click.browser {
                *browsers.entry(browser.clone()).or_insert(0) += 1;
            }
            if let Some(referer) = &click.referer {
                *referrers.entry(referer.clone()).or_insert(0) += 1;
            }
        }

        let sorted_desc = |map: HashMap<String, i64>| {
            let mut items: Vec<(String, i64)> = map.into_iter().collect();
            items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            items
        };

        let mut top_referrers = sorted_desc(referrers);
        top_referrers.truncate(10);

        Ok(ClickBreakdown {
            by_device: sorted_desc(devices),
            by_browser: sorted_desc(browsers),
            top_referrers,
        })
    }
}

#[async_trait]
impl AggregateRepository for MemoryStore {
    async fn upsert_day(&self, day: NaiveDate, rollup: &DayRollup) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner.stats.insert(
            (rollup.link_id, day),
            DailyStat {
                link_id: rollup.link_id,
                day,
                clicks: rollup.clicks,
                unique_visitors: rollup.unique_visitors,
            },
        );
        Ok(())
    }

    async fn for_link(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStat>, AppError> {
        let inner = self.lock();
        let mut stats: Vec<DailyStat> = inner
            .stats
            .values()
            .filter(|s| s.link_id == link_id && s.day >= from && s.day <= to)
            .cloned()
            .collect();
        stats.sort_by_key(|s| s.day);
        Ok(stats)
    }

    async fn trends(&self, from: NaiveDate) -> Result<Vec<TrendPoint>, AppError> {
        let inner = self.lock();

        let mut per_day: HashMap<NaiveDate, (i64, i64)> = HashMap::new();
        for stat in inner.stats.values().filter(|s| s.day >= from) {
            let entry = per_day.entry(stat.day).or_default();
            entry.0 += stat.clicks;
            entry.1 += stat.unique_visitors;
        }

        let mut trends: Vec<TrendPoint> = per_day
            .into_iter()
            .map(|(day, (clicks, unique_visitors))| TrendPoint {
                day,
                clicks,
                unique_visitors,
            })
            .collect();
        trends.sort_by_key(|t| t.day);
        Ok(trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(code: &str) -> NewLink {
        NewLink {
            code: code.to_string(),
            target_url: "https://example.com".to_string(),
            title: None,
            description: None,
            expires_at: None,
        }
    }

    fn new_click(link_id: i64, fingerprint: &str) -> NewClick {
        NewClick {
            link_id,
            ip: Some("10.0.0.1".to_string()),
            user_agent: None,
            referer: None,
            device_type: Some("desktop".to_string()),
            browser: None,
            os: None,
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_code() {
        let store = MemoryStore::new();
        store.create(new_link("dup")).await.unwrap();

        let err = store.create(new_link("dup")).await.unwrap_err();
        assert!(crate::error::is_unique_violation_on_code(&err));
    }

    #[tokio::test]
    async fn test_record_click_applies_counter_deltas() {
        let store = MemoryStore::new();
        let link = store.create(new_link("abc")).await.unwrap();

        store.record_click(new_click(link.id, "fp1"), true).await.unwrap();
        store.record_click(new_click(link.id, "fp1"), false).await.unwrap();

        let stored = store.find_by_code("abc").await.unwrap().unwrap();
        assert_eq!(stored.clicks, 2);
        assert_eq!(stored.unique_clicks, 1);
        assert!(stored.last_accessed.is_some());
    }

    #[tokio::test]
    async fn test_fingerprint_seen_is_per_link() {
        let store = MemoryStore::new();
        let a = store.create(new_link("aaa")).await.unwrap();
        let b = store.create(new_link("bbb")).await.unwrap();

        store.record_click(new_click(a.id, "fp1"), true).await.unwrap();

        assert!(store.fingerprint_seen(a.id, "fp1").await.unwrap());
        assert!(!store.fingerprint_seen(b.id, "fp1").await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_expired_flips_only_past_expiries() {
        let store = MemoryStore::new();
        let mut expired = new_link("old");
        expired.expires_at = Some(Utc::now() - chrono::Duration::days(1));
        store.create(expired).await.unwrap();

        let mut fresh = new_link("new");
        fresh.expires_at = Some(Utc::now() + chrono::Duration::days(1));
        store.create(fresh).await.unwrap();

        let swept = store.sweep_expired(Utc::now()).await.unwrap();
        assert_eq!(swept, 1);

        assert!(store.find_active_by_code("old").await.unwrap().is_none());
        assert!(store.find_active_by_code("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_day_rollups_counts_distinct_fingerprints() {
        let store = MemoryStore::new();
        let link = store.create(new_link("xyz")).await.unwrap();

        for fp in ["f1", "f2", "f1"] {
            store.record_click(new_click(link.id, fp), false).await.unwrap();
        }

        let rollups = store.day_rollups(Utc::now().date_naive()).await.unwrap();
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].clicks, 3);
        assert_eq!(rollups[0].unique_visitors, 2);
    }
}
