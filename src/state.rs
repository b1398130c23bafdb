//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{
    AnalyticsService, LinkService, QrService, ResolverService, StatsService,
};
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::Cache;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverService>,
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub qr_service: Arc<QrService>,
    pub cache: Arc<dyn Cache>,
    /// Present on PostgreSQL deployments; `None` when running on the
    /// in-memory store (tests, cache-less development).
    pub db: Option<Arc<PgPool>>,
    /// Sender side of the click queue, kept for health reporting.
    pub click_tx: mpsc::Sender<ClickEvent>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client IPs.
    pub behind_proxy: bool,
}
