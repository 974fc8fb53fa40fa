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

mod config;
mod driver;
mod extent;
mod geometry;
mod natural_earth;
mod output;
mod render;

use std::path::PathBuf;

use clap::Parser;
use log::{info, log, warn, Level};
use rainviewer_client::{RadarError, RainViewerClient};

use config::AppConfig;
use driver::RunOutcome;
use natural_earth::{NaturalEarth, NoOverlays};
use render::MapRenderer;

#[derive(Parser, Debug)]
#[command(name = "radar-snap")]
#[command(about = "Render the latest RainViewer radar tile over a map and save it as PNG")]
struct Cli {
    /// Latitude of the tile centre (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the tile centre (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Tile zoom level, nominally 2-9
    #[arg(long)]
    zoom: Option<u8>,

    /// Render without writing the PNG
    #[arg(long)]
    no_save: bool,

    /// Directory the PNG is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip land, coastline and border overlays
    #[arg(long)]
    no_overlays: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(lat) = self.lat {
            config.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.longitude = lon;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        if self.no_save {
            config.auto_save = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if self.no_overlays {
            config.overlays = false;
        }
    }
}

fn load_config(cli: &Cli) -> AppConfig {
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => {
            if cli.config.is_none() {
                if let Ok(path) = AppConfig::get_config_path() {
                    info!("Loaded configuration from {}", path.display());
                }
            }
            config
        }
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {e}");
            AppConfig::default()
        }
    };
    cli.apply(&mut config);
    config
}

fn snapshot(config: &AppConfig) -> Result<RunOutcome, RadarError> {
    let client = RainViewerClient::new(config.client_config())?;
    let renderer = MapRenderer::new(config.map_style())?;

    if config.overlays {
        let features = NaturalEarth::new(
            config.natural_earth_base_url.clone(),
            config.cache_dir(),
            config.overlay_timeout(),
        )?;
        driver::run(config, &client, &features, &renderer)
    } else {
        driver::run(config, &client, &NoOverlays, &renderer)
    }
}

/// Final log line for a run. Failures are reported here and nowhere else;
/// the process exits 0 either way.
fn outcome_line(result: &Result<RunOutcome, RadarError>) -> (Level, String) {
    match result {
        Ok(RunOutcome::Saved(path)) => (Level::Debug, format!("Snapshot written to {}", path.display())),
        Ok(outcome) => (Level::Debug, format!("Snapshot finished: {outcome:?}")),
        Err(e) => (Level::Error, format!("Error: {e} ({} error)", e.kind())),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    let (level, line) = outcome_line(&snapshot(&config));
    log!(level, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["radar-snap"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "radar-snap",
            "--lat",
            "-33.86",
            "--lon",
            "151.2",
            "--zoom",
            "5",
            "--no-save",
            "--no-overlays",
            "--output-dir",
            "/tmp/radar",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert!((config.latitude + 33.86).abs() < f64::EPSILON);
        assert!((config.longitude - 151.2).abs() < f64::EPSILON);
        assert_eq!(config.zoom, 5);
        assert!(!config.auto_save);
        assert!(!config.overlays);
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/radar"));
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.toml");
        std::fs::write(&path, "zoom = 4\n").unwrap();

        let cli = Cli::parse_from(["radar-snap", "--config", path.to_str().unwrap(), "--zoom", "6"]);
        let config = load_config(&cli);
        assert_eq!(config.zoom, 6);
    }

    #[test]
    fn test_failure_is_logged_as_error_line() {
        let result = Err(RadarError::Response {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "https://api.rainviewer.com/public/weather-maps.json".to_string(),
        });

        let (level, line) = outcome_line(&result);
        assert_eq!(level, Level::Error);
        assert!(line.starts_with("Error: 503"), "{line}");
        assert!(line.ends_with("(response error)"), "{line}");
    }

    #[test]
    fn test_success_is_logged_quietly() {
        let saved = Ok(RunOutcome::Saved(PathBuf::from("/tmp/radar_20231114_2213_z7.png")));
        let (level, line) = outcome_line(&saved);
        assert_eq!(level, Level::Debug);
        assert!(line.contains("radar_20231114_2213_z7.png"));

        let (level, line) = outcome_line(&Ok(RunOutcome::NoImage));
        assert_eq!(level, Level::Debug);
        assert_eq!(line, "Snapshot finished: NoImage");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
