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

//! Application configuration management.
//!
//! Settings are stored as TOML through confy. Every field has a serde default
//! so a partial or empty file still yields a complete configuration; the
//! defaults reproduce the stock snapshot (zoom 7 over northern Luzon, saved
//! to the working directory). The loaded value is treated as immutable for
//! the rest of the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rainviewer_client::{ClientConfig, TileRequest, DEFAULT_API_URL, DEFAULT_TILE_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::render::style::MapStyle;

/// confy application name
pub const APP_NAME: &str = "radar-snap";

/// Default Natural Earth GeoJSON mirror
pub const DEFAULT_NATURAL_EARTH_URL: &str =
    "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson";

/// Snapshot configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Centre latitude in degrees
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Centre longitude in degrees
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Tile zoom level (2 - 9, lower covers a wider area)
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Write the rendered map to a PNG file
    #[serde(default = "default_true")]
    pub auto_save: bool,

    /// Directory for output PNGs (working directory when unset)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// RainViewer colour scheme id
    #[serde(default = "default_color_scheme")]
    pub color_scheme: u8,

    /// Requested tile edge in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: u16,

    /// Smooth radar cells (0 or 1)
    #[serde(default)]
    pub smooth: u8,

    /// Separate snow colouring (0 or 1)
    #[serde(default)]
    pub snow: u8,

    /// Radar layer opacity (0.0 - 1.0)
    #[serde(default = "default_radar_opacity")]
    pub radar_opacity: f32,

    /// Weather-maps index URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Tile cache base URL
    #[serde(default = "default_tile_base_url")]
    pub tile_base_url: String,

    /// Timeout for the index request, in seconds
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,

    /// Timeout for the tile request, in seconds
    #[serde(default = "default_tile_timeout_secs")]
    pub tile_timeout_secs: u64,

    /// Draw land, coastlines and borders
    #[serde(default = "default_true")]
    pub overlays: bool,

    /// Base URL for Natural Earth GeoJSON layers
    #[serde(default = "default_natural_earth_url")]
    pub natural_earth_base_url: String,

    /// Timeout for a single overlay download, in seconds
    #[serde(default = "default_overlay_timeout_secs")]
    pub overlay_timeout_secs: u64,

    /// Override for the overlay data cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_latitude() -> f64 {
    15.7
}

fn default_longitude() -> f64 {
    121.7
}

fn default_zoom() -> u8 {
    7
}

fn default_true() -> bool {
    true
}

fn default_color_scheme() -> u8 {
    6
}

fn default_tile_size() -> u16 {
    256
}

fn default_radar_opacity() -> f32 {
    0.8
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_tile_base_url() -> String {
    DEFAULT_TILE_BASE_URL.to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    10
}

fn default_tile_timeout_secs() -> u64 {
    15
}

fn default_natural_earth_url() -> String {
    DEFAULT_NATURAL_EARTH_URL.to_string()
}

fn default_overlay_timeout_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            zoom: default_zoom(),
            auto_save: true,
            output_dir: None,
            color_scheme: default_color_scheme(),
            tile_size: default_tile_size(),
            smooth: 0,
            snow: 0,
            radar_opacity: default_radar_opacity(),
            api_url: default_api_url(),
            tile_base_url: default_tile_base_url(),
            metadata_timeout_secs: default_metadata_timeout_secs(),
            tile_timeout_secs: default_tile_timeout_secs(),
            overlays: true,
            natural_earth_base_url: default_natural_earth_url(),
            overlay_timeout_secs: default_overlay_timeout_secs(),
            cache_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, or from `path` when
    /// given. A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, confy::ConfyError> {
        match path {
            Some(path) => confy::load_path(path),
            None => confy::load(APP_NAME, "config"),
        }
    }

    /// Get the default config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, "config")
    }

    /// Whether the zoom level is inside the range the tile cache documents.
    #[must_use]
    pub fn zoom_in_documented_range(&self) -> bool {
        (2..=9).contains(&self.zoom)
    }

    /// Tile request for a radar frame, using this configuration's point and
    /// rendering options.
    #[must_use]
    pub fn tile_request(&self, timestamp: i64) -> TileRequest {
        TileRequest {
            color: self.color_scheme,
            tile_size: self.tile_size,
            smooth: self.smooth,
            snow: self.snow,
            ..TileRequest::new(timestamp, self.zoom, self.latitude, self.longitude)
        }
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            tile_base_url: self.tile_base_url.clone(),
            metadata_timeout: Duration::from_secs(self.metadata_timeout_secs),
            tile_timeout: Duration::from_secs(self.tile_timeout_secs),
        }
    }

    /// Directory output files are written to
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Directory for cached overlay data
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join(APP_NAME)
                .join("natural_earth")
        })
    }

    #[must_use]
    pub fn overlay_timeout(&self) -> Duration {
        Duration::from_secs(self.overlay_timeout_secs)
    }

    /// Default map style with this configuration's radar opacity
    #[must_use]
    pub fn map_style(&self) -> MapStyle {
        MapStyle {
            radar_opacity: self.radar_opacity,
            ..MapStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_snapshot() {
        let config = AppConfig::default();
        assert_eq!(config.zoom, 7);
        assert!((config.latitude - 15.7).abs() < f64::EPSILON);
        assert!((config.longitude - 121.7).abs() < f64::EPSILON);
        assert!(config.auto_save);
        assert!(config.zoom_in_documented_range());
        assert_eq!(config.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            latitude = 44.31
            longitude = -69.78
            zoom = 5
            auto_save = false
            "#,
        )
        .unwrap();
        assert_eq!(config.zoom, 5);
        assert!(!config.auto_save);
        assert_eq!(config.tile_timeout_secs, 15);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_load_path_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar-snap.toml");

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_path_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radar-snap.toml");
        std::fs::write(&path, "zoom = 9\noverlays = false\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.zoom, 9);
        assert!(!config.overlays);
    }

    #[test]
    fn test_tile_request_uses_config_options() {
        let config = AppConfig {
            color_scheme: 2,
            smooth: 1,
            ..AppConfig::default()
        };
        let request = config.tile_request(1_700_000_000);
        assert_eq!(request.zoom, 7);
        assert_eq!(request.color, 2);
        assert_eq!(request.smooth, 1);
        assert_eq!(request.snow, 0);
        assert_eq!(request.tile_size, 256);
    }

    #[test]
    fn test_zoom_range_is_reported_not_enforced() {
        let config = AppConfig {
            zoom: 12,
            ..AppConfig::default()
        };
        assert!(!config.zoom_in_documented_range());
        assert_eq!(config.tile_request(1).zoom, 12);
    }

    #[test]
    fn test_map_style_takes_radar_opacity() {
        let config = AppConfig {
            radar_opacity: 0.5,
            ..AppConfig::default()
        };
        let style = config.map_style();
        assert!((style.radar_opacity - 0.5).abs() < f32::EPSILON);
        assert_eq!(style.figure_px(), 3000);
    }

    #[test]
    fn test_client_config_timeouts() {
        let client = AppConfig::default().client_config();
        assert_eq!(client.metadata_timeout, Duration::from_secs(10));
        assert_eq!(client.tile_timeout, Duration::from_secs(15));
    }
}
