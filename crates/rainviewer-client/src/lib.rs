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

//! Client library for the RainViewer public radar service.
//!
//! Two endpoints are wrapped:
//!
//! - **Weather-maps index**: lists the published radar frames; the newest
//!   entry of `radar.past` identifies the latest snapshot
//! - **Tile cache**: renders a radar tile centred on a latitude/longitude
//!
//! # Quick Start
//!
//! ```no_run
//! use rainviewer_client::{ClientConfig, RadarSource, RainViewerClient, TileOutcome, TileRequest};
//!
//! let client = RainViewerClient::new(ClientConfig::default())?;
//! let frame = client.latest_frame()?;
//!
//! match client.fetch_tile(&TileRequest::new(frame.time, 7, 15.7, 121.7))? {
//!     TileOutcome::Image(tile) => println!("{}x{} tile", tile.width(), tile.height()),
//!     TileOutcome::Unavailable { status, .. } => println!("no tile ({status})"),
//! }
//! # Ok::<(), rainviewer_client::RadarError>(())
//! ```

pub mod client;
pub mod error;
pub mod maps;
pub mod tile;

pub use client::{ClientConfig, RadarSource, RainViewerClient, DEFAULT_API_URL};
pub use error::{ErrorKind, RadarError};
pub use maps::{RadarFrame, RadarSection, WeatherMaps};
pub use tile::{format_coordinate, TileImage, TileOutcome, TileRequest, DEFAULT_TILE_BASE_URL};
