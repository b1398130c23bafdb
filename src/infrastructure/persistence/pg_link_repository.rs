//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkOrder, LinkQuery, LinkRepository, LinkTotals};
use crate::error::AppError;

/// Row shape for the `links` table.
///
/// Lives in the repository layer so that domain entities stay free of sqlx
/// derives; queries bind at runtime and need no database at build time.
#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target_url: String,
    title: Option<String>,
    description: Option<String>,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    clicks: i64,
    unique_clicks: i64,
    last_accessed: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            code: r.code,
            target_url: r.target_url,
            title: r.title,
            description: r.description,
            is_active: r.is_active,
            expires_at: r.expires_at,
            clicks: r.clicks,
            unique_clicks: r.unique_clicks,
            last_accessed: r.last_accessed,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const LINK_COLUMNS: &str = "id, code, target_url, title, description, is_active, expires_at, \
     clicks, unique_clicks, last_accessed, created_at, updated_at";

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (code, target_url, title, description, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.code)
            .bind(&new_link.target_url)
            .bind(&new_link.title)
            .bind(&new_link.description)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1 AND is_active");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list(&self, query: LinkQuery) -> Result<Vec<Link>, AppError> {
        let order = match query.order {
            LinkOrder::CreatedAtDesc => "created_at DESC",
            LinkOrder::CreatedAtAsc => "created_at ASC",
            LinkOrder::ClicksDesc => "clicks DESC",
            LinkOrder::ClicksAsc => "clicks ASC",
        };

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE ($1::boolean IS FALSE OR is_active) \
               AND ($2::text IS NULL \
                    OR code ILIKE '%' || $2 || '%' \
                    OR target_url ILIKE '%' || $2 || '%' \
                    OR title ILIKE '%' || $2 || '%') \
             ORDER BY {order} \
             LIMIT $3 OFFSET $4"
        );

        let offset = (query.page - 1).max(0) * query.page_size;

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(query.active_only)
            .bind(query.search.as_deref())
            .bind(query.page_size)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count(&self, search: Option<String>, active_only: bool) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM links \
             WHERE ($1::boolean IS FALSE OR is_active) \
               AND ($2::text IS NULL \
                    OR code ILIKE '%' || $2 || '%' \
                    OR target_url ILIKE '%' || $2 || '%' \
                    OR title ILIKE '%' || $2 || '%')",
        )
        .bind(active_only)
        .bind(search)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let current = self.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        let target_url = patch.target_url.unwrap_or(current.target_url);
        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.unwrap_or(current.description);
        let expires_at = patch.expires_at.unwrap_or(current.expires_at);
        let is_active = patch.is_active.unwrap_or(current.is_active);

        let sql = format!(
            "UPDATE links \
             SET target_url = $1, title = $2, description = $3, expires_at = $4, \
                 is_active = $5, updated_at = NOW() \
             WHERE code = $6 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&target_url)
            .bind(&title)
            .bind(&description)
            .bind(expires_at)
            .bind(is_active)
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn deactivate(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE links SET is_active = FALSE, updated_at = NOW() \
             WHERE code = $1 AND is_active",
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE links SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active AND expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(clicks), 0)::bigint, \
                    COALESCE(SUM(unique_clicks), 0)::bigint \
             FROM links WHERE is_active",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkTotals {
            active_links: row.0,
            total_clicks: row.1,
            total_unique_visitors: row.2,
        })
    }
}
