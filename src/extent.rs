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

//! Geographic extent covered by a centred radar tile.

/// Tile width in degrees at a zoom level: `360 / 2^zoom`.
#[must_use]
pub fn tile_span_degrees(zoom: u8) -> f64 {
    360.0 / 2_f64.powi(i32::from(zoom))
}

/// `[lon_min, lon_max, lat_min, lat_max]` box in plate carrée degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl MapExtent {
    /// Square extent of one tile span centred on `(lat, lon)`.
    #[must_use]
    pub fn around(lat: f64, lon: f64, zoom: u8) -> Self {
        let half = tile_span_degrees(zoom) / 2.0;
        Self {
            lon_min: lon - half,
            lon_max: lon + half,
            lat_min: lat - half,
            lat_max: lat + half,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Whether another box overlaps this one (edges touching counts).
    #[must_use]
    pub fn intersects(&self, other: &MapExtent) -> bool {
        self.lon_min <= other.lon_max
            && other.lon_min <= self.lon_max
            && self.lat_min <= other.lat_max
            && other.lat_min <= self.lat_max
    }

    /// `count` evenly spaced longitudes from `lon_min` to `lon_max` inclusive.
    #[must_use]
    pub fn lon_ticks(&self, count: usize) -> Vec<f64> {
        linspace(self.lon_min, self.lon_max, count)
    }

    /// `count` evenly spaced latitudes from `lat_min` to `lat_max` inclusive.
    #[must_use]
    pub fn lat_ticks(&self, count: usize) -> Vec<f64> {
        linspace(self.lat_min, self.lat_max, count)
    }
}

/// Evenly spaced values over a closed interval. The last value is exactly
/// `end`.
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            #[allow(clippy::cast_precision_loss, reason = "tick counts are tiny")]
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        #[allow(clippy::cast_precision_loss, reason = "tick counts are tiny")]
                        let offset = i as f64 * step;
                        start + offset
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_luzon_zoom_7() {
        assert!((tile_span_degrees(7) - 2.8125).abs() < EPS);

        let extent = MapExtent::around(15.7, 121.7, 7);
        assert!((extent.lon_min - 120.293_75).abs() < EPS);
        assert!((extent.lon_max - 123.106_25).abs() < EPS);
        assert!((extent.lat_min - 14.293_75).abs() < EPS);
        assert!((extent.lat_max - 17.106_25).abs() < EPS);
    }

    #[test]
    fn test_extent_is_centred_for_documented_zooms() {
        for zoom in 2..=9 {
            let delta = tile_span_degrees(zoom);
            assert!(delta > 0.0, "zoom {zoom}");

            let extent = MapExtent::around(15.7, 121.7, zoom);
            assert!(extent.lon_min < 121.7 && 121.7 < extent.lon_max, "zoom {zoom}");
            assert!(extent.lat_min < 15.7 && 15.7 < extent.lat_max, "zoom {zoom}");
            assert!((extent.width() - delta).abs() < EPS);
            assert!((extent.height() - delta).abs() < EPS);

            let lat = (extent.lat_min + extent.lat_max) / 2.0;
            let lon = (extent.lon_min + extent.lon_max) / 2.0;
            assert!((lat - 15.7).abs() < EPS && (lon - 121.7).abs() < EPS);
        }
    }

    #[test]
    fn test_higher_zoom_covers_less() {
        assert!(tile_span_degrees(9) < tile_span_degrees(2));
        assert!((tile_span_degrees(2) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_linspace_nine_ticks() {
        let extent = MapExtent::around(15.7, 121.7, 7);
        let ticks = extent.lon_ticks(9);
        assert_eq!(ticks.len(), 9);
        assert!((ticks[0] - extent.lon_min).abs() < EPS);
        assert!((ticks[4] - 121.7).abs() < EPS);
        assert_eq!(ticks[8], extent.lon_max);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }

    #[test]
    fn test_intersects() {
        let extent = MapExtent::around(0.0, 0.0, 4);
        let far = MapExtent {
            lon_min: 100.0,
            lon_max: 110.0,
            lat_min: -5.0,
            lat_max: 5.0,
        };
        assert!(!extent.intersects(&far));
        assert!(!far.intersects(&extent));
        assert!(MapExtent::around(0.0, 0.0, 0).intersects(&far));

        let touching = MapExtent {
            lon_min: extent.lon_max,
            lon_max: extent.lon_max + 1.0,
            ..extent
        };
        assert!(extent.intersects(&touching));
    }
}
