//! QR rendering for verification URLs.
//!
//! [`SvgQrEncoder`] renders the URL with `qrcode` as an SVG document and
//! wraps it in a base64 `data:image/svg+xml` URI, so the record carries a
//! self-contained image.

use base64::{Engine, engine::general_purpose::STANDARD};
use qrcode::{QrCode, render::svg};

use crate::{error::BoxError, issuance::QrEncoder};

/// Media type prefix of the data URIs [`SvgQrEncoder`] produces.
pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Default minimum edge length of the rendered image, in pixels.
pub const DEFAULT_MIN_DIMENSION: u32 = 200;

/// Renders URLs as black-on-white SVG QR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgQrEncoder {
    min_dimension: u32,
}

impl SvgQrEncoder {
    /// Creates an encoder whose images are at least `min_dimension` pixels
    /// on each side.
    #[must_use]
    pub const fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }

    /// Returns the minimum edge length in pixels.
    #[must_use]
    pub const fn min_dimension(&self) -> u32 {
        self.min_dimension
    }

    /// Renders `url` as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is too long for any QR version.
    pub fn render_svg(&self, url: &str) -> Result<String, qrcode::types::QrError> {
        let code = QrCode::new(url.as_bytes())?;
        Ok(code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }
}

impl Default for SvgQrEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DIMENSION)
    }
}

impl QrEncoder for SvgQrEncoder {
    fn encode(&self, url: &str) -> Result<String, BoxError> {
        let svg = self.render_svg(url)?;
        Ok(format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(svg)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const URL: &str = "https://certs.example.test/search?id=IADC-2025-0001";

    #[test]
    fn test_encode_produces_svg_data_uri() {
        let uri = SvgQrEncoder::default().encode(URL).unwrap();
        assert!(uri.starts_with(SVG_DATA_URI_PREFIX), "got {uri}");

        let payload = uri.strip_prefix(SVG_DATA_URI_PREFIX).unwrap();
        let svg = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert!(svg.contains("<svg"), "not an SVG document: {svg}");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = SvgQrEncoder::default();
        assert_eq!(encoder.encode(URL).unwrap(), encoder.encode(URL).unwrap());
    }

    #[test]
    fn test_different_urls_render_differently() {
        let encoder = SvgQrEncoder::default();
        let other = "https://certs.example.test/search?id=IADC-2025-0002";
        assert_ne!(encoder.encode(URL).unwrap(), encoder.encode(other).unwrap());
    }

    #[test]
    fn test_oversized_input_is_an_error() {
        // Version 40 at the lowest error correction holds under 3 KB of bytes.
        let url = format!("https://certs.example.test/search?id={}", "X".repeat(8_000));
        assert!(SvgQrEncoder::default().encode(&url).is_err());
    }

    #[test]
    fn test_min_dimension() {
        assert_eq!(SvgQrEncoder::default().min_dimension(), DEFAULT_MIN_DIMENSION);
        assert_eq!(SvgQrEncoder::new(320).min_dimension(), 320);
    }
}
