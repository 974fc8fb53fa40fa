// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Radar tile requests and decoded tile images.
//!
//! RainViewer can render a tile centred on an arbitrary coordinate instead of
//! the usual `z/x/y` grid. The request is fully described by [`TileRequest`];
//! turning it into a URL is a pure function.

use image::RgbaImage;
use reqwest::StatusCode;

use crate::error::RadarError;

/// Default tile cache host
pub const DEFAULT_TILE_BASE_URL: &str = "https://tilecache.rainviewer.com";

/// Parameters that fully determine one radar tile URL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    /// Radar frame timestamp (unix seconds)
    pub timestamp: i64,
    /// Zoom level, nominally 2-9. Not validated.
    pub zoom: u8,
    pub lat: f64,
    pub lon: f64,
    /// RainViewer colour scheme id
    pub color: u8,
    /// Tile edge in pixels (256 or 512)
    pub tile_size: u16,
    /// 1 to blur the radar data, 0 for raw cells
    pub smooth: u8,
    /// 1 to colour snow separately, 0 otherwise
    pub snow: u8,
}

impl TileRequest {
    /// Create a request with the default rendering options
    /// (colour scheme 6, 256px, unsmoothed, no snow mask).
    #[must_use]
    pub fn new(timestamp: i64, zoom: u8, lat: f64, lon: f64) -> Self {
        Self {
            timestamp,
            zoom,
            lat,
            lon,
            color: 6,
            tile_size: 256,
            smooth: 0,
            snow: 0,
        }
    }

    /// Build the tile URL against the given cache host.
    ///
    /// `base_url` is the scheme and host without a trailing slash, e.g.
    /// [`DEFAULT_TILE_BASE_URL`].
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/v2/radar/{}/{}/{}/{}/{}/{}/{}_{}.png",
            base_url.trim_end_matches('/'),
            self.timestamp,
            self.tile_size,
            self.zoom,
            format_coordinate(self.lat),
            format_coordinate(self.lon),
            self.color,
            self.smooth,
            self.snow
        )
    }
}

/// Print a coordinate in its shortest round-trip form, keeping a trailing
/// `.0` on integral values (`121.0`, not `121`).
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Decoded radar tile with a transparency channel.
#[derive(Debug, Clone)]
pub struct TileImage {
    pixels: RgbaImage,
}

impl TileImage {
    /// Decode PNG/JPEG/WebP bytes into an RGBA bitmap.
    pub fn decode(bytes: &[u8]) -> Result<Self, RadarError> {
        let pixels = image::load_from_memory(bytes)
            .map_err(|e| RadarError::MalformedData(format!("tile image: {e}")))?
            .to_rgba8();
        Ok(Self { pixels })
    }

    #[must_use]
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Result of a tile fetch that reached the server.
///
/// A missing tile is a normal outcome (the cache has nothing for that
/// frame/area), so it is reported here rather than as a [`RadarError`].
#[derive(Debug, Clone)]
pub enum TileOutcome {
    Image(TileImage),
    Unavailable {
        status: StatusCode,
        content_type: Option<String>,
    },
}

impl TileOutcome {
    #[must_use]
    pub fn image(self) -> Option<TileImage> {
        match self {
            Self::Image(img) => Some(img),
            Self::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Whether a tile response should be decoded as an image.
///
/// Only an exact `200` with an `image/*` content type qualifies; redirects
/// already followed by the client and `204`s do not.
#[must_use]
pub fn is_image_response(status: StatusCode, content_type: Option<&str>) -> bool {
    status == StatusCode::OK && content_type.is_some_and(|ct| ct.starts_with("image"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_url_with_defaults() {
        let request = TileRequest::new(1_700_000_000, 7, 15.7, 121.7);
        assert_eq!(
            request.url(DEFAULT_TILE_BASE_URL),
            "https://tilecache.rainviewer.com/v2/radar/1700000000/256/7/15.7/121.7/6/0_0.png"
        );
    }

    #[test]
    fn test_url_is_deterministic() {
        let a = TileRequest::new(1_699_999_800, 5, -33.865, 151.2094);
        let b = TileRequest::new(1_699_999_800, 5, -33.865, 151.2094);
        assert_eq!(a.url(DEFAULT_TILE_BASE_URL), b.url(DEFAULT_TILE_BASE_URL));
        assert_eq!(a.url(DEFAULT_TILE_BASE_URL), a.url(DEFAULT_TILE_BASE_URL));
    }

    #[test]
    fn test_url_custom_options_and_trailing_slash() {
        let request = TileRequest {
            color: 2,
            tile_size: 512,
            smooth: 1,
            snow: 1,
            ..TileRequest::new(1_700_000_000, 3, 44.31, -69.78)
        };
        assert_eq!(
            request.url("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000/v2/radar/1700000000/512/3/44.31/-69.78/2/1_1.png"
        );
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(15.7), "15.7");
        assert_eq!(format_coordinate(121.0), "121.0");
        assert_eq!(format_coordinate(-0.5), "-0.5");
        assert_eq!(format_coordinate(0.0), "0.0");
        assert_eq!(format_coordinate(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_is_image_response() {
        assert!(is_image_response(StatusCode::OK, Some("image/png")));
        assert!(is_image_response(StatusCode::OK, Some("image/webp; q=1")));
        assert!(!is_image_response(StatusCode::OK, Some("text/html")));
        assert!(!is_image_response(StatusCode::OK, None));
        assert!(!is_image_response(StatusCode::NOT_FOUND, Some("image/png")));
        assert!(!is_image_response(StatusCode::NO_CONTENT, Some("image/png")));
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let mut source = RgbaImage::new(4, 2);
        source.put_pixel(1, 1, image::Rgba([200, 10, 10, 128]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        source.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let tile = TileImage::decode(bytes.get_ref()).unwrap();
        assert_eq!((tile.width(), tile.height()), (4, 2));
        assert_eq!(tile.pixels().get_pixel(1, 1).0, [200, 10, 10, 128]);
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let err = TileImage::decode(b"not an image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }
}
