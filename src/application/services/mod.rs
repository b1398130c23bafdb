//! Business logic services for the application layer.

pub mod analytics_service;
pub mod link_service;
pub mod qr_service;
pub mod resolver_service;
pub mod stats_service;

pub use analytics_service::{AggregationReport, AnalyticsConfig, AnalyticsService};
pub use link_service::{CreateLink, LinkService};
pub use qr_service::QrService;
pub use resolver_service::{ClickContext, Resolution, ResolverService};
pub use stats_service::{DashboardReport, LinkStatsReport, StatsService};
