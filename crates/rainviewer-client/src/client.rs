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

//! Blocking HTTP client for the RainViewer endpoints.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::RadarError;
use crate::maps::{RadarFrame, WeatherMaps};
use crate::tile::{is_image_response, TileImage, TileOutcome, TileRequest, DEFAULT_TILE_BASE_URL};

/// Default weather-maps index URL
pub const DEFAULT_API_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

/// Endpoints and timeouts for [`RainViewerClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the weather-maps index
    pub api_url: String,
    /// Tile cache scheme and host
    pub tile_base_url: String,
    /// Timeout for the index request
    pub metadata_timeout: Duration,
    /// Timeout for a tile request
    pub tile_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tile_base_url: DEFAULT_TILE_BASE_URL.to_string(),
            metadata_timeout: Duration::from_secs(10),
            tile_timeout: Duration::from_secs(15),
        }
    }
}

/// Source of radar frames and tiles.
///
/// Implemented by [`RainViewerClient`]; callers that orchestrate a run take
/// this trait so they can be exercised without a network.
pub trait RadarSource {
    /// Fetch the most recent published radar frame.
    fn latest_frame(&self) -> Result<RadarFrame, RadarError>;

    /// Fetch one tile. A server that answers without an image yields
    /// [`TileOutcome::Unavailable`], not an error.
    fn fetch_tile(&self, request: &TileRequest) -> Result<TileOutcome, RadarError>;
}

/// Blocking RainViewer client. Each call issues exactly one request; there
/// are no retries.
#[derive(Debug, Clone)]
pub struct RainViewerClient {
    http: Client,
    config: ClientConfig,
}

impl RainViewerClient {
    pub fn new(config: ClientConfig) -> Result<Self, RadarError> {
        let http = Client::builder()
            .user_agent(concat!("radar-snap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RadarError::transport(&config.api_url, e))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL a request would be sent to
    #[must_use]
    pub fn tile_url(&self, request: &TileRequest) -> String {
        request.url(&self.config.tile_base_url)
    }
}

impl RadarSource for RainViewerClient {
    fn latest_frame(&self) -> Result<RadarFrame, RadarError> {
        let url = &self.config.api_url;
        debug!("Requesting weather maps index from {url}");

        let response = self
            .http
            .get(url)
            .timeout(self.config.metadata_timeout)
            .send()
            .map_err(|e| RadarError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadarError::Response {
                status,
                url: url.clone(),
            });
        }

        let body = response.bytes().map_err(|e| RadarError::transport(url, e))?;
        let maps = WeatherMaps::from_slice(&body)?;
        Ok(maps.latest_past_frame()?.clone())
    }

    fn fetch_tile(&self, request: &TileRequest) -> Result<TileOutcome, RadarError> {
        let url = self.tile_url(request);
        info!("Fetching: {url}");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.tile_timeout)
            .send()
            .map_err(|e| RadarError::transport(&url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !is_image_response(status, content_type.as_deref()) {
            warn!("Failed to load tile. Status: {}", status.as_u16());
            return Ok(TileOutcome::Unavailable {
                status,
                content_type,
            });
        }

        let bytes = response.bytes().map_err(|e| RadarError::transport(&url, e))?;
        let tile = TileImage::decode(&bytes)?;
        debug!("Decoded {}x{} radar tile", tile.width(), tile.height());

        Ok(TileOutcome::Image(tile))
    }
}
