//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Sort order for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    ClicksDesc,
    ClicksAsc,
}

impl LinkOrder {
    /// Parses the `order_by` query parameter (`created_at`, `-created_at`,
    /// `clicks`, `-clicks`). Unknown values fall back to newest-first.
    pub fn parse(s: &str) -> Self {
        match s {
            "created_at" => Self::CreatedAtAsc,
            "-created_at" => Self::CreatedAtDesc,
            "clicks" => Self::ClicksAsc,
            "-clicks" => Self::ClicksDesc,
            _ => Self::CreatedAtDesc,
        }
    }
}

/// Filter and pagination criteria for link listings.
#[derive(Debug, Clone)]
pub struct LinkQuery {
    /// 1-indexed page number.
    pub page: i64,
    pub page_size: i64,
    /// Case-insensitive substring match against code, target URL, and title.
    pub search: Option<String>,
    pub order: LinkOrder,
    /// When true, only `is_active = true` links are returned.
    pub active_only: bool,
}

impl LinkQuery {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            search: None,
            order: LinkOrder::default(),
            active_only: true,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    pub fn with_order(mut self, order: LinkOrder) -> Self {
        self.order = order;
        self
    }
}

/// Service-wide totals for the dashboard view.
#[derive(Debug, Clone, Default)]
pub struct LinkTotals {
    pub active_links: i64,
    pub total_clicks: i64,
    pub total_unique_visitors: i64,
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-memory
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists (the unique
    /// constraint is the final arbiter of generation races).
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code regardless of active state.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by code, filtered to `is_active = true`.
    ///
    /// This is the resolution-path lookup: inactive links are
    /// indistinguishable from absent ones.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists links with search, ordering, and pagination.
    async fn list(&self, query: LinkQuery) -> Result<Vec<Link>, AppError>;

    /// Counts links matching the search filter (for pagination metadata).
    async fn count(&self, search: Option<String>, active_only: bool) -> Result<i64, AppError>;

    /// Partially updates a link. The code is immutable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `code`.
    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError>;

    /// Soft-deletes a link by setting `is_active = false`.
    ///
    /// Returns `Ok(true)` if the link was found and deactivated, `Ok(false)`
    /// if it did not exist or was already inactive.
    async fn deactivate(&self, code: &str) -> Result<bool, AppError>;

    /// Flips `is_active = false` for every active link whose expiry has
    /// passed. Returns the number of affected rows.
    ///
    /// This is an optimization for listing/counting queries; resolution
    /// re-checks expiry live and does not depend on it.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Service-wide totals over active links.
    async fn totals(&self) -> Result<LinkTotals, AppError>;
}
