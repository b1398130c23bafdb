//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{ClickBreakdown, ClickRepository, DayRollup, RankedLink};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    device_type: Option<String>,
    browser: Option<String>,
    os: Option<String>,
    fingerprint: String,
    clicked_at: DateTime<Utc>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            ip: r.ip,
            user_agent: r.user_agent,
            referer: r.referer,
            device_type: r.device_type,
            browser: r.browser,
            os: r.os,
            fingerprint: r.fingerprint,
            clicked_at: r.clicked_at,
        }
    }
}

const CLICK_COLUMNS: &str =
    "id, link_id, ip, user_agent, referer, device_type, browser, os, fingerprint, clicked_at";

/// Maximum batch-delete iterations per retention run.
const MAX_DELETE_ITERATIONS: usize = 1000;

/// PostgreSQL repository for click persistence and analytics reads.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick, is_unique: bool) -> Result<Click, AppError> {
        // Click insert and counter deltas commit together: concurrent
        // ingestions never lose an increment and a failed insert never
        // bumps a counter.
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO clicks \
                 (link_id, ip, user_agent, referer, device_type, browser, os, fingerprint) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CLICK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(new_click.link_id)
            .bind(&new_click.ip)
            .bind(&new_click.user_agent)
            .bind(&new_click.referer)
            .bind(&new_click.device_type)
            .bind(&new_click.browser)
            .bind(&new_click.os)
            .bind(&new_click.fingerprint)
            .fetch_one(&mut *tx)
            .await?;

        let unique_delta: i64 = if is_unique { 1 } else { 0 };

        sqlx::query(
            "UPDATE links \
             SET clicks = clicks + 1, unique_clicks = unique_clicks + $2, \
                 last_accessed = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(new_click.link_id)
        .bind(unique_delta)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn fingerprint_seen(&self, link_id: i64, fingerprint: &str) -> Result<bool, AppError> {
        let seen = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM clicks WHERE link_id = $1 AND fingerprint = $2)",
        )
        .bind(link_id)
        .bind(fingerprint)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(seen)
    }

    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let sql = format!(
            "SELECT {CLICK_COLUMNS} FROM clicks \
             WHERE link_id = $1 ORDER BY clicked_at DESC LIMIT $2"
        );

        let rows = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(link_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn day_rollups(&self, day: NaiveDate) -> Result<Vec<DayRollup>, AppError> {
        let start = day.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
        let end = start + chrono::Duration::days(1);

        let rows = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT link_id, COUNT(*)::bigint, COUNT(DISTINCT fingerprint)::bigint \
             FROM clicks \
             WHERE clicked_at >= $1 AND clicked_at < $2 \
             GROUP BY link_id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(link_id, clicks, unique_visitors)| DayRollup {
                link_id,
                clicks,
                unique_visitors,
            })
            .collect())
    }

    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64, AppError> {
        let mut total_deleted = 0u64;

        // Bounded batches keep each transaction short; the pause between
        // batches limits pressure on the hot ingestion path.
        for iteration in 0..MAX_DELETE_ITERATIONS {
            let result = sqlx::query(
                "DELETE FROM clicks WHERE id IN \
                     (SELECT id FROM clicks WHERE clicked_at < $1 ORDER BY id LIMIT $2)",
            )
            .bind(cutoff)
            .bind(batch_size)
            .execute(self.pool.as_ref())
            .await?;

            let deleted = result.rows_affected();
            total_deleted += deleted;

            debug!(
                "Retention batch {}: deleted {} rows (total {})",
                iteration + 1,
                deleted,
                total_deleted
            );

            if deleted < batch_size as u64 {
                break;
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Ok(total_deleted)
    }

    async fn top_links_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<RankedLink>, AppError> {
        let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(
            "SELECT l.code, l.title, COUNT(c.id)::bigint AS recent_clicks \
             FROM clicks c \
             JOIN links l ON l.id = c.link_id \
             WHERE c.clicked_at >= $1 AND l.is_active \
             GROUP BY l.id, l.code, l.title \
             ORDER BY recent_clicks DESC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, title, clicks)| RankedLink {
                code,
                title,
                clicks,
            })
            .collect())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clicks WHERE clicked_at >= $1")
                .bind(since)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn breakdown(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<ClickBreakdown, AppError> {
        let by_device = sqlx::query_as::<_, (String, i64)>(
            "SELECT device_type, COUNT(*)::bigint FROM clicks \
             WHERE link_id = $1 AND clicked_at >= $2 AND device_type IS NOT NULL \
             GROUP BY device_type ORDER BY COUNT(*) DESC",
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        let by_browser = sqlx::query_as::<_, (String, i64)>(
            "SELECT browser, COUNT(*)::bigint FROM clicks \
             WHERE link_id = $1 AND clicked_at >= $2 AND browser IS NOT NULL \
             GROUP BY browser ORDER BY COUNT(*) DESC",
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        let top_referrers = sqlx::query_as::<_, (String, i64)>(
            "SELECT referer, COUNT(*)::bigint FROM clicks \
             WHERE link_id = $1 AND clicked_at >= $2 AND referer IS NOT NULL \
             GROUP BY referer ORDER BY COUNT(*) DESC LIMIT 10",
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ClickBreakdown {
            by_device,
            by_browser,
            top_referrers,
        })
    }
}
