//! QR code rendering with a derived cache.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use serde_json::json;
use tracing::debug;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{qr_key, Cache};

/// Service rendering QR code PNGs for short URLs.
///
/// Read-through cache keyed by the short code: the PNG is rendered on a miss
/// and cached for the configured TTL. Entries are invalidated by link
/// mutations and otherwise age out.
pub struct QrService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn Cache>,
    base_url: String,
    cache_ttl: Duration,
}

impl QrService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn Cache>,
        base_url: String,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            links,
            cache,
            base_url,
            cache_ttl,
        }
    }

    /// Returns the QR code PNG for an active link's short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or inactive.
    pub async fn qr_png(&self, code: &str) -> Result<Vec<u8>, AppError> {
        if self.links.find_active_by_code(code).await?.is_none() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        let key = qr_key(code);
        if let Ok(Some(png)) = self.cache.get(&key).await {
            debug!("QR cache HIT for {}", code);
            return Ok(png);
        }

        let short_url = format!("{}/{}", self.base_url.trim_end_matches('/'), code);
        let png = render_qr_png(&short_url)?;

        let _ = self.cache.set(&key, &png, Some(self.cache_ttl)).await;

        Ok(png)
    }
}

/// Renders `data` as a QR code and encodes it as PNG bytes.
fn render_qr_png(data: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| {
        AppError::internal(
            "Failed to build QR code",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(240, 240)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| {
            AppError::internal(
                "Failed to encode QR code PNG",
                json!({ "reason": e.to_string() }),
            )
        })?;

    Ok(png)
}
