//! Request and response bodies for the link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Body of `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(url(message = "target_url must be a valid URL"))]
    pub target_url: String,

    #[validate(length(min = 3, max = 20, message = "custom_code must be 3-20 characters"))]
    pub custom_code: Option<String>,

    #[validate(length(max = 255, message = "title is too long"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /api/links/{code}`.
///
/// Absent fields are left unchanged; `expires_at: null` explicitly clears
/// the expiry (distinguished from absence via the double option).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLinkRequest {
    pub target_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

fn deserialize_double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Full link representation returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub short_url: String,
    pub qr_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub clicks: i64,
    pub unique_clicks: i64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        let is_expired = link.is_expired();
        Self {
            qr_url: format!("/api/links/{}/qr", link.code),
            id: link.id,
            code: link.code,
            target_url: link.target_url,
            short_url,
            title: link.title,
            description: link.description,
            clicks: link.clicks,
            unique_clicks: link.unique_clicks,
            last_accessed: link.last_accessed,
            is_active: link.is_active,
            expires_at: link.expires_at,
            is_expired,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Paginated listing response.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
