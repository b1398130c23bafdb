//! Health check handler.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;

use crate::api::dto::HealthResponse;
use crate::state::AppState;

/// Reports service health: database reachability, cache reachability, and
/// remaining click-queue capacity.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db {
        Some(pool) => {
            if sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(pool.as_ref())
                .await
                .is_ok()
            {
                "ok"
            } else {
                "unavailable"
            }
        }
        None => "memory",
    };

    let cache = if state.cache.health_check().await {
        "ok"
    } else {
        "unavailable"
    };

    let status = if database == "unavailable" {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status,
        database,
        cache,
        click_queue_free: state.click_tx.capacity(),
        timestamp: Utc::now(),
    })
}
