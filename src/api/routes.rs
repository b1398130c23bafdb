//! API route configuration.

use crate::api::handlers::{
    create_link_handler, dashboard_handler, delete_link_handler, get_link_handler,
    link_stats_handler, list_links_handler, popular_links_handler, qr_handler,
    ranking_handler, recent_links_handler, trends_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST   /links`              - Create a short link
/// - `GET    /links`              - Paginated listing with search/ordering
/// - `GET    /links/popular`      - Top links by total clicks
/// - `GET    /links/recent`       - Newest links
/// - `GET    /links/{code}`       - Link detail
/// - `PATCH  /links/{code}`       - Partial update (invalidates cache)
/// - `DELETE /links/{code}`       - Soft delete (invalidates cache)
/// - `GET    /links/{code}/stats` - Per-link statistics
/// - `GET    /links/{code}/qr`    - QR code PNG
/// - `GET    /stats/dashboard`    - Service-wide totals
/// - `GET    /stats/trends`       - Per-day totals from daily aggregates
/// - `GET    /ranking`            - Trailing-window ranking
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route("/links/popular", get(popular_links_handler))
        .route("/links/recent", get(recent_links_handler))
        .route(
            "/links/{code}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{code}/stats", get(link_stats_handler))
        .route("/links/{code}/qr", get(qr_handler))
        .route("/stats/dashboard", get(dashboard_handler))
        .route("/stats/trends", get(trends_handler))
        .route("/ranking", get(ranking_handler))
}
