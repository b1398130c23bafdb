//! Link creation and management service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkQuery, LinkRepository};
use crate::error::{is_unique_violation_on_code, AppError};
use crate::infrastructure::cache::{link_key, qr_key, Cache};
use crate::utils::code_generator::{generate_code, validate_custom_code};

/// Generation attempts before giving up with `GenerationExhausted`.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Input for creating a short link.
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub target_url: String,
    pub custom_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating and managing shortened links.
///
/// Every mutation proactively invalidates the link's cache entries, so the
/// resolver's staleness window collapses to zero for the common soft-delete
/// and update cases; TTL expiry covers the rest.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn Cache>,
    base_url: String,
    code_length: usize,
    custom_codes_enabled: bool,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn Cache>,
        base_url: String,
        code_length: usize,
        custom_codes_enabled: bool,
    ) -> Self {
        Self {
            links,
            cache,
            base_url,
            code_length,
            custom_codes_enabled,
        }
    }

    /// Creates a short link with a custom or generated code.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed target URL or custom code
    /// - [`AppError::Conflict`] when the custom code is already taken
    /// - [`AppError::GenerationExhausted`] when generated codes keep
    ///   colliding past the retry cap
    pub async fn create_link(&self, input: CreateLink) -> Result<Link, AppError> {
        validate_target_url(&input.target_url)?;

        if let Some(custom) = input.custom_code {
            if !self.custom_codes_enabled {
                return Err(AppError::bad_request(
                    "Custom codes are not enabled",
                    json!({}),
                ));
            }

            validate_custom_code(&custom)?;

            if self.links.find_by_code(&custom).await?.is_some() {
                return Err(AppError::conflict(
                    "This custom code is already taken",
                    json!({ "code": custom }),
                ));
            }

            let link = self
                .links
                .create(NewLink {
                    code: custom,
                    target_url: input.target_url,
                    title: input.title,
                    description: input.description,
                    expires_at: input.expires_at,
                })
                .await?;

            info!("Created link {} -> {}", link.code, link.target_url);
            return Ok(link);
        }

        self.create_with_generated_code(input).await
    }

    /// Generates a code, inserting with the unique constraint as the final
    /// arbiter: a lost race regenerates rather than failing the request.
    async fn create_with_generated_code(&self, input: CreateLink) -> Result<Link, AppError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = generate_code(self.code_length);

            if self.links.find_by_code(&code).await?.is_some() {
                continue;
            }

            match self
                .links
                .create(NewLink {
                    code,
                    target_url: input.target_url.clone(),
                    title: input.title.clone(),
                    description: input.description.clone(),
                    expires_at: input.expires_at,
                })
                .await
            {
                Ok(link) => {
                    info!("Created link {} -> {}", link.code, link.target_url);
                    return Ok(link);
                }
                // Two concurrent callers picked the same code and we lost
                // the insert race: try a fresh code.
                Err(e) if is_unique_violation_on_code(&e) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::generation_exhausted(
            "Failed to generate a unique code",
            json!({ "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }

    /// Retrieves a link by code, regardless of active state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })
    }

    /// Lists links with search, ordering, and pagination.
    pub async fn list_links(&self, query: LinkQuery) -> Result<(Vec<Link>, i64), AppError> {
        let total = self
            .links
            .count(query.search.clone(), query.active_only)
            .await?;
        let links = self.links.list(query).await?;
        Ok((links, total))
    }

    /// Partially updates a link and invalidates its cache entries.
    pub async fn update_link(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        if let Some(target_url) = &patch.target_url {
            validate_target_url(target_url)?;
        }

        let link = self.links.update(code, patch).await?;
        self.invalidate_cached(code).await;
        Ok(link)
    }

    /// Soft-deletes a link and invalidates its cache entries.
    ///
    /// The cache delete happens before returning, so the very next `resolve`
    /// call observes the deactivation.
    pub async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let deleted = self.links.deactivate(code).await?;
        if deleted {
            self.invalidate_cached(code).await;
            info!("Soft-deleted link {}", code);
        }
        Ok(deleted)
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    async fn invalidate_cached(&self, code: &str) {
        let _ = self.cache.invalidate(&link_key(code)).await;
        let _ = self.cache.invalidate(&qr_key(code)).await;
    }
}

fn validate_target_url(target: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(target).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AppError::bad_request(
            "URL scheme must be http or https",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    Ok(())
}
