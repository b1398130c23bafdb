#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use linklet::application::services::{
    AnalyticsConfig, AnalyticsService, LinkService, QrService, ResolverService, StatsService,
};
use linklet::domain::click_event::ClickEvent;
use linklet::domain::entities::{Link, NewLink};
use linklet::domain::repositories::LinkRepository;
use linklet::infrastructure::cache::MemoryCache;
use linklet::infrastructure::persistence::MemoryStore;
use linklet::state::AppState;

pub const BASE_URL: &str = "https://s.test";

/// Fully wired application state over the in-memory store and cache.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn build_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::default());
    let (click_tx, click_rx) = mpsc::channel(100);

    let links: Arc<dyn linklet::domain::repositories::LinkRepository> = store.clone();
    let clicks: Arc<dyn linklet::domain::repositories::ClickRepository> = store.clone();
    let aggregates: Arc<dyn linklet::domain::repositories::AggregateRepository> = store.clone();
    let cache_dyn: Arc<dyn linklet::infrastructure::cache::Cache> = cache.clone();

    let resolver = Arc::new(ResolverService::new(
        links.clone(),
        cache_dyn.clone(),
        click_tx.clone(),
        Duration::from_secs(3600),
    ));
    let link_service = Arc::new(LinkService::new(
        links.clone(),
        cache_dyn.clone(),
        BASE_URL.to_string(),
        6,
        true,
    ));
    let stats_service = Arc::new(StatsService::new(
        links.clone(),
        clicks.clone(),
        aggregates.clone(),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(
        links.clone(),
        clicks.clone(),
        aggregates.clone(),
        cache_dyn.clone(),
        AnalyticsConfig::default(),
    ));
    let qr_service = Arc::new(QrService::new(
        links,
        cache_dyn.clone(),
        BASE_URL.to_string(),
        Duration::from_secs(3600),
    ));

    let state = AppState {
        resolver,
        link_service,
        stats_service,
        analytics_service,
        qr_service,
        cache: cache_dyn,
        db: None,
        click_tx,
        behind_proxy: false,
    };

    TestApp {
        state,
        store,
        cache,
        click_rx,
    }
}

pub async fn create_test_link(store: &MemoryStore, code: &str, url: &str) -> Link {
    store
        .create(NewLink {
            code: code.to_string(),
            target_url: url.to_string(),
            title: None,
            description: None,
            expires_at: None,
        })
        .await
        .unwrap()
}

pub async fn create_expiring_link(
    store: &MemoryStore,
    code: &str,
    url: &str,
    expires_at: DateTime<Utc>,
) -> Link {
    store
        .create(NewLink {
            code: code.to_string(),
            target_url: url.to_string(),
            title: None,
            description: None,
            expires_at: Some(expires_at),
        })
        .await
        .unwrap()
}

/// A click event with an explicit fingerprint, bypassing derivation.
pub fn click_event(link: &Link, fingerprint: &str) -> ClickEvent {
    ClickEvent {
        link_id: link.id,
        code: link.code.clone(),
        ip: Some("10.0.0.1".to_string()),
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0".to_string()),
        referer: None,
        fingerprint: fingerprint.to_string(),
    }
}
