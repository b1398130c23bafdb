//! Handler for short URL redirects.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::application::services::{ClickContext, Resolution};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code (cache-aside, live expiry check)
/// 2. Enqueue a click event (fire-and-forget)
/// 3. Respond immediately
///
/// # Responses
///
/// - `302 Found` with `Location` on success
/// - `404 Not Found` for an unknown or inactive code
/// - `410 Gone` for a known link past its expiry
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let ctx = ClickContext {
        ip: Some(client_ip(&headers, addr, state.behind_proxy)),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        referer: headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
    };

    match state.resolver.resolve(&code, ctx).await? {
        Resolution::Redirect(target) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
        }
        Resolution::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        )),
        Resolution::Gone => Err(AppError::gone(
            "This short link has expired",
            json!({ "code": code }),
        )),
    }
}
