//! Data transfer objects for the REST API.

pub mod health;
pub mod links;
pub mod pagination;
pub mod stats;

pub use health::HealthResponse;
pub use links::{CreateLinkRequest, LinkListResponse, LinkResponse, UpdateLinkRequest};
pub use pagination::{LimitParams, ListParams};
pub use stats::{DashboardResponse, LinkStatsResponse, RankingResponse, TrendsResponse};
