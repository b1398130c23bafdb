//! Rate limiting middleware using a token bucket per client IP.
//!
//! Applied to the `/api` surface, which includes the creation boundary.
//! The redirect path is never rate limited: its cost is one cache read.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorLayer,
};

/// Creates the rate limiter for the API surface.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 60 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Limits are
/// keyed by the socket peer address.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(60)
            .finish()
            .expect("static rate limit config is valid"),
    );

    GovernorLayer::new(governor_conf)
}
