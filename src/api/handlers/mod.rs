//! HTTP request handlers.

pub mod health;
pub mod links;
pub mod qr;
pub mod redirect;
pub mod stats;

pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    popular_links_handler, recent_links_handler, update_link_handler,
};
pub use qr::qr_handler;
pub use redirect::redirect_handler;
pub use stats::{dashboard_handler, link_stats_handler, ranking_handler, trends_handler};
