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

//! One snapshot run: latest frame, tile, render, save.

use std::path::PathBuf;

use log::{debug, info, warn};
use rainviewer_client::{RadarError, RadarSource, TileOutcome};

use crate::config::AppConfig;
use crate::natural_earth::FeatureSource;
use crate::render::{MapRenderer, MapView, Overlays};

/// How a run ended when nothing went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The figure was written to this path
    Saved(PathBuf),
    /// The figure was drawn but saving is disabled
    Rendered,
    /// The tile cache had no image for the requested tile
    NoImage,
}

/// Fetch the newest radar frame for the configured point and render it.
///
/// A missing tile is a normal outcome. Errors from any step are returned
/// unchanged and end the run.
pub fn run(
    config: &AppConfig,
    radar: &impl RadarSource,
    features: &impl FeatureSource,
    renderer: &MapRenderer,
) -> Result<RunOutcome, RadarError> {
    info!("Fetching latest radar image...");
    if !config.zoom_in_documented_range() {
        warn!("Zoom {} is outside the documented range 2-9; using it anyway", config.zoom);
    }

    let frame = radar.latest_frame()?;
    debug!("Latest radar frame: {} ({:?})", frame.time, frame.captured_at());

    let request = config.tile_request(frame.time);
    let tile = match radar.fetch_tile(&request)? {
        TileOutcome::Image(tile) => tile,
        TileOutcome::Unavailable { .. } => {
            info!("No image available.");
            return Ok(RunOutcome::NoImage);
        }
    };

    let view = MapView {
        lat: config.latitude,
        lon: config.longitude,
        zoom: config.zoom,
        timestamp: frame.time,
    };
    let overlays = Overlays::load(features, &view.extent())?;

    let save_dir = config.auto_save.then(|| config.output_dir());
    match renderer.render_map(&tile, &view, &overlays, save_dir.as_deref())? {
        Some(path) => Ok(RunOutcome::Saved(path)),
        None => Ok(RunOutcome::Rendered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::MapExtent;
    use crate::natural_earth::{FeatureLayer, Layer, NoOverlays};
    use crate::render::style::MapStyle;
    use image::{Rgba, RgbaImage};
    use rainviewer_client::{ErrorKind, RadarFrame, TileImage, TileRequest};
    use reqwest::StatusCode;
    use std::cell::{Cell, RefCell};

    /// Scripted radar source that records what was asked of it
    struct StubRadar {
        frame: Option<RadarFrame>,
        tile_status: Option<StatusCode>,
        tile_requests: RefCell<Vec<TileRequest>>,
    }

    impl StubRadar {
        fn with_tile(status: Option<StatusCode>) -> Self {
            Self {
                frame: Some(RadarFrame {
                    time: 1_700_000_000,
                    path: Some("/v2/radar/1700000000".to_string()),
                }),
                tile_status: status,
                tile_requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl RadarSource for StubRadar {
        fn latest_frame(&self) -> Result<RadarFrame, RadarError> {
            self.frame.clone().ok_or_else(|| RadarError::Response {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                url: "http://stub/weather-maps.json".to_string(),
            })
        }

        fn fetch_tile(&self, request: &TileRequest) -> Result<TileOutcome, RadarError> {
            self.tile_requests.borrow_mut().push(*request);
            Ok(match self.tile_status {
                None => TileOutcome::Image(TileImage::from_rgba(RgbaImage::from_pixel(
                    256,
                    256,
                    Rgba([0, 160, 255, 200]),
                ))),
                Some(status) => TileOutcome::Unavailable {
                    status,
                    content_type: Some("text/html".to_string()),
                },
            })
        }
    }

    /// Feature source that counts loads
    #[derive(Default)]
    struct CountingFeatures {
        loads: Cell<usize>,
    }

    impl FeatureSource for CountingFeatures {
        fn load(&self, _layer: Layer, _extent: &MapExtent) -> Result<FeatureLayer, RadarError> {
            self.loads.set(self.loads.get() + 1);
            Ok(FeatureLayer::default())
        }
    }

    fn renderer() -> MapRenderer {
        MapRenderer::new(MapStyle {
            figure_inches: 4.0,
            dpi: 50.0,
            ..MapStyle::default()
        })
        .unwrap()
    }

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            output_dir: Some(dir.to_path_buf()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_saves_named_png() {
        let dir = tempfile::tempdir().unwrap();
        let radar = StubRadar::with_tile(None);

        let outcome = run(&config_in(dir.path()), &radar, &NoOverlays, &renderer()).unwrap();

        let expected = dir.path().join("radar_20231114_2213_z7.png");
        assert_eq!(outcome, RunOutcome::Saved(expected.clone()));
        assert!(expected.exists());

        let requests = radar.tile_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timestamp, 1_700_000_000);
        assert_eq!(requests[0].zoom, 7);
    }

    #[test]
    fn test_missing_tile_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let radar = StubRadar::with_tile(Some(StatusCode::NOT_FOUND));
        let features = CountingFeatures::default();

        let outcome = run(&config_in(dir.path()), &radar, &features, &renderer()).unwrap();

        assert_eq!(outcome, RunOutcome::NoImage);
        assert_eq!(features.loads.get(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_metadata_failure_skips_tile_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let radar = StubRadar {
            frame: None,
            ..StubRadar::with_tile(None)
        };

        let err = run(&config_in(dir.path()), &radar, &NoOverlays, &renderer()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Response);
        assert!(err.to_string().contains("500"));
        assert!(radar.tile_requests.borrow().is_empty());
    }

    #[test]
    fn test_auto_save_off_renders_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            auto_save: false,
            ..config_in(dir.path())
        };
        let features = CountingFeatures::default();

        let outcome = run(&config, &StubRadar::with_tile(None), &features, &renderer()).unwrap();

        assert_eq!(outcome, RunOutcome::Rendered);
        assert_eq!(features.loads.get(), Layer::ALL.len());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_out_of_range_zoom_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            zoom: 11,
            ..config_in(dir.path())
        };
        let radar = StubRadar::with_tile(None);

        let outcome = run(&config, &radar, &NoOverlays, &renderer()).unwrap();

        assert_eq!(radar.tile_requests.borrow()[0].zoom, 11);
        assert_eq!(outcome, RunOutcome::Saved(dir.path().join("radar_20231114_2213_z11.png")));
    }
}
