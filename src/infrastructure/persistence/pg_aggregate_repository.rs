//! PostgreSQL implementation of the daily aggregate repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::DailyStat;
use crate::domain::repositories::{AggregateRepository, DayRollup, TrendPoint};
use crate::error::AppError;

/// PostgreSQL repository for the `daily_stats` table.
pub struct PgAggregateRepository {
    pool: Arc<PgPool>,
}

impl PgAggregateRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AggregateRepository for PgAggregateRepository {
    async fn upsert_day(&self, day: NaiveDate, rollup: &DayRollup) -> Result<(), AppError> {
        // Overwrite, never add: re-running aggregation for a day must yield
        // the same stored totals.
        sqlx::query(
            "INSERT INTO daily_stats (link_id, day, clicks, unique_visitors) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (link_id, day) DO UPDATE \
                 SET clicks = EXCLUDED.clicks, unique_visitors = EXCLUDED.unique_visitors",
        )
        .bind(rollup.link_id)
        .bind(day)
        .bind(rollup.clicks)
        .bind(rollup.unique_visitors)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn for_link(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStat>, AppError> {
        let rows = sqlx::query_as::<_, (i64, NaiveDate, i64, i64)>(
            "SELECT link_id, day, clicks, unique_visitors FROM daily_stats \
             WHERE link_id = $1 AND day >= $2 AND day <= $3 \
             ORDER BY day ASC",
        )
        .bind(link_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(link_id, day, clicks, unique_visitors)| DailyStat {
                link_id,
                day,
                clicks,
                unique_visitors,
            })
            .collect())
    }

    async fn trends(&self, from: NaiveDate) -> Result<Vec<TrendPoint>, AppError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64, i64)>(
            "SELECT day, COALESCE(SUM(clicks), 0)::bigint, \
                    COALESCE(SUM(unique_visitors), 0)::bigint \
             FROM daily_stats \
             WHERE day >= $1 \
             GROUP BY day ORDER BY day ASC",
        )
        .bind(from)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(day, clicks, unique_visitors)| TrendPoint {
                day,
                clicks,
                unique_visitors,
            })
            .collect())
    }
}
