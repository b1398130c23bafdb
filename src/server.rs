//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, scheduled
//! jobs, and the Axum server lifecycle.

use crate::application::services::{
    AnalyticsConfig, AnalyticsService, LinkService, QrService, ResolverService, StatsService,
};
use crate::config::Config;
use crate::domain::click_worker::{run_click_worker, WorkerConfig};
use crate::infrastructure::cache::{Cache, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    PgAggregateRepository, PgClickRepository, PgLinkRepository,
};
use crate::infrastructure::scheduler::{self, ScheduleConfig};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::extract::Request;
use axum::ServiceExt;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes, in order:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (in-process or null fallback)
/// - Background click worker
/// - Scheduled analytics jobs
/// - Axum HTTP server with graceful shutdown
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let cache_ttl = Duration::from_secs(config.cache_ttl_seconds);
    let cache: Arc<dyn Cache> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, cache_ttl).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache enabled (in-process)");
        Arc::new(MemoryCache::new(cache_ttl))
    };

    let pool = Arc::new(pool);
    let link_repo = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repo = Arc::new(PgClickRepository::new(pool.clone()));
    let aggregate_repo = Arc::new(PgAggregateRepository::new(pool.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    tokio::spawn(run_click_worker(
        click_rx,
        click_repo.clone(),
        WorkerConfig {
            concurrency: config.click_worker_concurrency,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(config.click_retry_delay_secs),
        },
    ));
    tracing::info!("Click worker started");

    let resolver = Arc::new(ResolverService::new(
        link_repo.clone(),
        cache.clone(),
        click_tx.clone(),
        cache_ttl,
    ));
    let link_service = Arc::new(LinkService::new(
        link_repo.clone(),
        cache.clone(),
        config.base_url.clone(),
        config.code_length,
        config.custom_codes_enabled,
    ));
    let stats_service = Arc::new(StatsService::new(
        link_repo.clone(),
        click_repo.clone(),
        aggregate_repo.clone(),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(
        link_repo.clone(),
        click_repo.clone(),
        aggregate_repo.clone(),
        cache.clone(),
        AnalyticsConfig {
            retention_days: config.retention_days,
            ranking_window_days: config.ranking_window_days,
            ranking_limit: config.ranking_limit,
            ranking_ttl: Duration::from_secs(config.ranking_refresh_secs),
        },
    ));
    let qr_service = Arc::new(QrService::new(
        link_repo.clone(),
        cache.clone(),
        config.base_url.clone(),
        Duration::from_secs(config.qr_cache_ttl_seconds),
    ));

    scheduler::spawn_jobs(
        analytics_service.clone(),
        ScheduleConfig {
            aggregation_interval: Duration::from_secs(config.aggregation_interval_secs),
            retention_interval: Duration::from_secs(config.retention_interval_secs),
            ranking_interval: Duration::from_secs(config.ranking_refresh_secs),
        },
    );

    let state = AppState {
        resolver,
        link_service,
        stats_service,
        analytics_service,
        qr_service,
        cache,
        db: Some(pool),
        click_tx,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}
