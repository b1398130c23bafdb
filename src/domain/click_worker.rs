//! Background worker consuming click events from the redirect path.
//!
//! The worker decouples the synchronous redirect from click persistence:
//! events arrive on a bounded channel, are classified and checked for
//! visitor uniqueness, then persisted together with the link counter deltas.
//! Delivery within the process is at-most-once; a failed event is retried a
//! bounded number of times with a fixed delay and then dropped: analytics
//! loss is acceptable, redirect correctness is not.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::utils::user_agent;

/// Tuning knobs for the ingestion worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum events processed concurrently.
    pub concurrency: usize,
    /// Total attempts per event (first try included).
    pub retry_attempts: usize,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(60),
        }
    }
}

/// Runs the click ingestion loop until the channel closes.
///
/// Each event is dispatched to its own task, bounded by a semaphore so a
/// slow store cannot pile up unbounded in-flight work. Outstanding tasks are
/// drained before the worker returns, so a graceful shutdown loses nothing
/// that was already dequeued.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<dyn ClickRepository>,
    config: WorkerConfig,
) {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        while tasks.try_join_next().is_some() {}

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("ingestion semaphore never closes");
        let clicks = clicks.clone();
        let config = config.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let code = event.code.clone();

            match ingest(clicks.as_ref(), &event, &config).await {
                Ok(()) => {
                    counter!("clicks_ingested_total").increment(1);
                    debug!("Click ingested for {}", code);
                }
                Err(e) => {
                    counter!("clicks_ingest_failed_total").increment(1);
                    warn!("Dropping click for {} after retries: {}", code, e);
                }
            }
        });
    }

    while tasks.join_next().await.is_some() {}
}

/// Ingests one click event with bounded fixed-delay retry.
///
/// Retries wrap the whole persistence step; the uniqueness check is a
/// deterministic point lookup, so re-running an attempt is idempotent with
/// respect to the unique-visitor decision.
pub async fn ingest(
    clicks: &dyn ClickRepository,
    event: &ClickEvent,
    config: &WorkerConfig,
) -> Result<(), AppError> {
    let strategy =
        FixedInterval::new(config.retry_delay).take(config.retry_attempts.saturating_sub(1));

    Retry::spawn(strategy, || ingest_once(clicks, event)).await
}

async fn ingest_once(clicks: &dyn ClickRepository, event: &ClickEvent) -> Result<(), AppError> {
    // Classification is best effort and never fails the pipeline.
    let ua = user_agent::classify(event.user_agent.as_deref());

    // Unique for the link's entire lifetime, not per day.
    let is_unique = !clicks
        .fingerprint_seen(event.link_id, &event.fingerprint)
        .await?;

    let new_click = NewClick {
        link_id: event.link_id,
        ip: event.ip.clone(),
        user_agent: event.user_agent.clone(),
        referer: event.referer.clone(),
        device_type: Some(ua.device_type),
        browser: ua.browser,
        os: ua.os,
        fingerprint: event.fingerprint.clone(),
    };

    clicks.record_click(new_click, is_unique).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickRepository;
    use serde_json::json;

    fn test_config() -> WorkerConfig {
        WorkerConfig {
            concurrency: 2,
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1),
        }
    }

    fn test_event(fingerprint: &str) -> ClickEvent {
        ClickEvent {
            link_id: 1,
            code: "abc123".to_string(),
            ip: Some("10.0.0.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: None,
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ingest_marks_first_click_unique() {
        let mut repo = MockClickRepository::new();

        repo.expect_fingerprint_seen()
            .times(1)
            .returning(|_, _| Ok(false));
        repo.expect_record_click()
            .withf(|_, is_unique| *is_unique)
            .times(1)
            .returning(|click, _| {
                Ok(crate::domain::entities::Click {
                    id: 1,
                    link_id: click.link_id,
                    ip: click.ip,
                    user_agent: click.user_agent,
                    referer: click.referer,
                    device_type: click.device_type,
                    browser: click.browser,
                    os: click.os,
                    fingerprint: click.fingerprint,
                    clicked_at: chrono::Utc::now(),
                })
            });

        ingest(&repo, &test_event("fp1"), &test_config())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ingest_repeat_fingerprint_not_unique() {
        let mut repo = MockClickRepository::new();

        repo.expect_fingerprint_seen()
            .times(1)
            .returning(|_, _| Ok(true));
        repo.expect_record_click()
            .withf(|_, is_unique| !*is_unique)
            .times(1)
            .returning(|click, _| {
                Ok(crate::domain::entities::Click {
                    id: 2,
                    link_id: click.link_id,
                    ip: click.ip,
                    user_agent: click.user_agent,
                    referer: click.referer,
                    device_type: click.device_type,
                    browser: click.browser,
                    os: click.os,
                    fingerprint: click.fingerprint,
                    clicked_at: chrono::Utc::now(),
                })
            });

        ingest(&repo, &test_event("fp1"), &test_config())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ingest_retries_then_gives_up() {
        let mut repo = MockClickRepository::new();

        // Three attempts total, all failing the uniqueness lookup.
        repo.expect_fingerprint_seen()
            .times(3)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let result = ingest(&repo, &test_event("fp1"), &test_config()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ingest_recovers_on_transient_failure() {
        let mut repo = MockClickRepository::new();
        let mut calls = 0;

        repo.expect_fingerprint_seen().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(false)
            }
        });
        repo.expect_record_click().times(1).returning(|click, _| {
            Ok(crate::domain::entities::Click {
                id: 3,
                link_id: click.link_id,
                ip: click.ip,
                user_agent: click.user_agent,
                referer: click.referer,
                device_type: click.device_type,
                browser: click.browser,
                os: click.os,
                fingerprint: click.fingerprint,
                clicked_at: chrono::Utc::now(),
            })
        });

        ingest(&repo, &test_event("fp1"), &test_config())
            .await
            .unwrap();
    }
}
