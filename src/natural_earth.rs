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

//! Natural Earth overlay data.
//!
//! Land polygons and coastline/border lines come from the Natural Earth
//! GeoJSON distribution. Layers are downloaded on first use and kept in a
//! local cache, gzip-compressed and named by the SHA256 of their source URL,
//! so later runs work offline. Radar tiles are never cached here.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info, warn};
use rainviewer_client::RadarError;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::extent::MapExtent;
use crate::geometry::{bounds, GeoPoint, Polygon};

/// Natural Earth resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Coarse,
    Medium,
    Fine,
}

impl Scale {
    /// Resolution for a map extent, chosen from its shorter side: 110m above
    /// 50 degrees, 50m down to 15 degrees, 10m below that.
    #[must_use]
    pub fn for_extent(extent: &MapExtent) -> Self {
        let span = extent.width().abs().min(extent.height().abs());
        if span <= 0.0 || span > 50.0 {
            Scale::Coarse
        } else if span > 15.0 {
            Scale::Medium
        } else {
            Scale::Fine
        }
    }

    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Scale::Coarse => "110m",
            Scale::Medium => "50m",
            Scale::Fine => "10m",
        }
    }
}

/// Overlay layers drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Land,
    Coastline,
    Borders,
    Provinces,
}

impl Layer {
    /// All layers in draw order
    pub const ALL: [Layer; 4] = [Layer::Land, Layer::Coastline, Layer::Borders, Layer::Provinces];

    /// Resolution used for this layer over `extent`. Land and national
    /// borders follow the extent; coastlines and provinces are always 10m.
    #[must_use]
    pub fn scale(self, extent: &MapExtent) -> Scale {
        match self {
            Layer::Land | Layer::Borders => Scale::for_extent(extent),
            Layer::Coastline | Layer::Provinces => Scale::Fine,
        }
    }

    /// Natural Earth dataset name, scale prefix included
    #[must_use]
    pub fn dataset(self, extent: &MapExtent) -> String {
        let name = match self {
            Layer::Land => "land",
            Layer::Coastline => "coastline",
            Layer::Borders => "admin_0_boundary_lines_land",
            Layer::Provinces => "admin_1_states_provinces_lines",
        };
        format!("ne_{}_{name}", self.scale(extent).prefix())
    }

    #[must_use]
    pub fn url(self, base_url: &str, extent: &MapExtent) -> String {
        format!("{}/{}.geojson", base_url.trim_end_matches('/'), self.dataset(extent))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
}

/// GeoJSON geometry, positions as `[lon, lat, ...]`
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point,
    MultiPoint,
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

/// Geometry of one overlay layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureLayer {
    pub polygons: Vec<Polygon>,
    pub lines: Vec<Vec<GeoPoint>>,
}

impl FeatureLayer {
    /// Parse a GeoJSON document. Points are ignored; everything else is
    /// flattened into polygons and polylines.
    pub fn from_geojson(text: &str) -> Result<Self, RadarError> {
        let malformed = |e: serde_json::Error| RadarError::MalformedData(format!("GeoJSON: {e}"));
        let document: serde_json::Value = serde_json::from_str(text).map_err(malformed)?;

        let mut layer = FeatureLayer::default();
        match document.get("type").and_then(serde_json::Value::as_str) {
            Some("FeatureCollection") => {
                let collection: FeatureCollection = serde_json::from_value(document).map_err(malformed)?;
                for feature in collection.features {
                    if let Some(geometry) = feature.geometry {
                        layer.push_geometry(geometry);
                    }
                }
            }
            Some("Feature") => {
                let feature: Feature = serde_json::from_value(document).map_err(malformed)?;
                if let Some(geometry) = feature.geometry {
                    layer.push_geometry(geometry);
                }
            }
            _ => layer.push_geometry(serde_json::from_value(document).map_err(malformed)?),
        }
        Ok(layer)
    }

    fn push_geometry(&mut self, geometry: Geometry) {
        match geometry {
            Geometry::LineString { coordinates } => self.lines.push(to_points(&coordinates)),
            Geometry::MultiLineString { coordinates } => {
                self.lines.extend(coordinates.iter().map(|line| to_points(line)));
            }
            Geometry::Polygon { coordinates } => self.push_polygon(&coordinates),
            Geometry::MultiPolygon { coordinates } => {
                for rings in &coordinates {
                    self.push_polygon(rings);
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    self.push_geometry(geometry);
                }
            }
            Geometry::Point | Geometry::MultiPoint => {}
        }
    }

    fn push_polygon(&mut self, rings: &[Vec<Vec<f64>>]) {
        let mut rings = rings.iter().map(|ring| to_points(ring));
        if let Some(exterior) = rings.next() {
            self.polygons.push(Polygon {
                exterior,
                holes: rings.collect(),
            });
        }
    }

    /// Keep only geometry whose bounding box touches `extent`.
    #[must_use]
    pub fn within(&self, extent: &MapExtent) -> FeatureLayer {
        let touches = |points: &[GeoPoint]| bounds(points).is_some_and(|b| b.intersects(extent));
        FeatureLayer {
            polygons: self
                .polygons
                .iter()
                .filter(|p| touches(&p.exterior))
                .cloned()
                .collect(),
            lines: self.lines.iter().filter(|l| touches(l)).cloned().collect(),
        }
    }

}

fn to_points(positions: &[Vec<f64>]) -> Vec<GeoPoint> {
    positions
        .iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| GeoPoint::new(pos[0], pos[1]))
        .collect()
}

/// Supplier of overlay geometry
pub trait FeatureSource {
    /// Geometry of `layer` at the resolution suited to `extent`.
    fn load(&self, layer: Layer, extent: &MapExtent) -> Result<FeatureLayer, RadarError>;
}

/// Source that draws nothing, for offline runs with overlays disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlays;

impl FeatureSource for NoOverlays {
    fn load(&self, _layer: Layer, _extent: &MapExtent) -> Result<FeatureLayer, RadarError> {
        Ok(FeatureLayer::default())
    }
}

/// Natural Earth GeoJSON downloader with an on-disk cache
#[derive(Debug)]
pub struct NaturalEarth {
    http: reqwest::blocking::Client,
    base_url: String,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl NaturalEarth {
    pub fn new(base_url: String, cache_dir: PathBuf, timeout: Duration) -> Result<Self, RadarError> {
        // Create cache directory if it doesn't exist
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create overlay cache directory {}: {e}", cache_dir.display());
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("radar-snap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RadarError::Transport {
                url: base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url,
            cache_dir,
            timeout,
        })
    }

    /// Cache path for a URL, named by the SHA256 of the URL
    fn cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let hash = hasher.finalize();
        self.cache_dir.join(format!("{hash:x}.geojson.gz"))
    }

    fn download(&self, url: &str) -> Result<String, RadarError> {
        info!("Downloading overlay data from {url}");

        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .map_err(|e| RadarError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadarError::Response {
                status,
                url: url.to_string(),
            });
        }

        response.text().map_err(|e| RadarError::Transport {
            url: url.to_string(),
            source: e,
        })
    }
}

impl FeatureSource for NaturalEarth {
    fn load(&self, layer: Layer, extent: &MapExtent) -> Result<FeatureLayer, RadarError> {
        let dataset = layer.dataset(extent);
        let url = layer.url(&self.base_url, extent);
        let cache_path = self.cache_path(&url);

        if cache_path.exists() {
            match read_cached(&cache_path).and_then(|text| FeatureLayer::from_geojson(&text)) {
                Ok(features) => {
                    debug!("Loaded {dataset} from cache");
                    return Ok(features);
                }
                Err(e) => warn!("Failed to load cached {dataset}: {e}"),
            }
        }

        let text = self.download(&url)?;
        let features = FeatureLayer::from_geojson(&text)?;

        if let Err(e) = write_cached(&cache_path, &text) {
            warn!("Failed to cache {dataset}: {e}");
        }

        Ok(features)
    }
}

fn read_cached(path: &Path) -> Result<String, RadarError> {
    let file = fs::File::open(path)?;
    let mut text = String::new();
    GzDecoder::new(file).read_to_string(&mut text)?;
    Ok(text)
}

fn write_cached(path: &Path, text: &str) -> Result<(), RadarError> {
    let file = fs::File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()?;
    Ok(())
}
