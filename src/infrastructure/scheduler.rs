//! Background job scheduling.
//!
//! Three independent interval loops drive the analytics jobs:
//!
//! - hourly: aggregate yesterday's clicks, then sweep expired links
//! - daily: retention sweep of raw click rows
//! - sub-hourly: ranking refresh over the trailing window
//!
//! Every job is idempotent and re-entrant, so an overlapping or repeated
//! invocation is harmless. Job errors are logged and the loop continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::application::services::AnalyticsService;

/// Cadence configuration for the scheduled jobs.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub aggregation_interval: Duration,
    pub retention_interval: Duration,
    pub ranking_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            aggregation_interval: Duration::from_secs(3600),
            retention_interval: Duration::from_secs(24 * 3600),
            ranking_interval: Duration::from_secs(1800),
        }
    }
}

/// Spawns the background job loops. Tasks run for the life of the process.
pub fn spawn_jobs(analytics: Arc<AnalyticsService>, config: ScheduleConfig) {
    {
        let analytics = analytics.clone();
        let interval = config.aggregation_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if let Err(e) = analytics.aggregate_yesterday().await {
                    error!("Aggregation job failed: {}", e);
                }
                if let Err(e) = analytics.sweep_expired().await {
                    error!("Expiry sweep failed: {}", e);
                }
            }
        });
    }

    {
        let analytics = analytics.clone();
        let interval = config.retention_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if let Err(e) = analytics.sweep_retention().await {
                    error!("Retention sweep failed: {}", e);
                }
            }
        });
    }

    {
        let interval = config.ranking_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if let Err(e) = analytics.refresh_ranking().await {
                    error!("Ranking refresh failed: {}", e);
                }
            }
        });
    }

    info!("Scheduled jobs started (aggregation, retention, ranking)");
}
