//! Handlers for statistics and ranking endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::dto::{DashboardResponse, LinkStatsResponse, RankingResponse, TrendsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Detailed statistics for one link.
///
/// # Endpoint
///
/// `GET /api/links/{code}/stats`
pub async fn link_stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.stats_service.link_stats(&code).await?;
    Ok(Json(LinkStatsResponse::from(report)))
}

/// Overall dashboard statistics.
///
/// # Endpoint
///
/// `GET /api/stats/dashboard`
pub async fn dashboard_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.stats_service.dashboard().await?;
    Ok(Json(DashboardResponse::from(report)))
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    pub days: Option<i64>,
}

/// Per-day click totals summed over all links.
///
/// # Endpoint
///
/// `GET /api/stats/trends?days=N` (default 30, max 365)
pub async fn trends_handler(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params.days.unwrap_or(30);
    if !(1..=365).contains(&days) {
        return Err(AppError::bad_request(
            "days must be between 1 and 365",
            json!({ "days": days }),
        ));
    }

    let trends = state.stats_service.trends(days).await?;
    Ok(Json(TrendsResponse {
        period_days: days,
        trends,
    }))
}

/// The cached trailing-window ranking, recomputed on a cache miss.
///
/// # Endpoint
///
/// `GET /api/ranking`
pub async fn ranking_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.analytics_service.ranking().await?;
    Ok(Json(RankingResponse { entries }))
}
