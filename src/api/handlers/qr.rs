//! Handler serving QR code images.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Returns the QR code PNG for an active link's short URL.
///
/// # Endpoint
///
/// `GET /api/links/{code}/qr`
///
/// The PNG is served from the derived cache when warm and rendered (then
/// cached) otherwise.
pub async fn qr_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let png = state.qr_service.qr_png(&code).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
