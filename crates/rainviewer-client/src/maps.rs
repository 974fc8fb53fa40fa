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

//! Weather-maps metadata document.
//!
//! RainViewer publishes a small JSON index listing every radar frame it
//! currently serves. Only the `radar.past` list is used for snapshots; the
//! remaining fields are kept so the document round-trips cleanly in logs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::RadarError;

/// Top-level `weather-maps.json` document
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMaps {
    #[serde(default)]
    pub version: Option<String>,

    /// Unix time the index was generated
    #[serde(default)]
    pub generated: Option<i64>,

    /// Tile cache host advertised by the index
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub radar: Option<RadarSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadarSection {
    #[serde(default)]
    pub past: Option<Vec<RadarFrame>>,

    #[serde(default)]
    pub nowcast: Option<Vec<RadarFrame>>,
}

/// One published radar snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RadarFrame {
    /// Unix seconds identifying the snapshot
    pub time: i64,

    /// Path prefix of the frame on the tile cache, e.g. `/v2/radar/1700000000`
    #[serde(default)]
    pub path: Option<String>,
}

impl RadarFrame {
    /// Snapshot time as a UTC datetime, if the timestamp is in range.
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

impl WeatherMaps {
    /// Parse the raw JSON body of the metadata endpoint.
    pub fn from_slice(body: &[u8]) -> Result<Self, RadarError> {
        serde_json::from_slice(body)
            .map_err(|e| RadarError::MalformedData(format!("weather-maps document: {e}")))
    }

    /// The most recent historical frame, i.e. the last entry of `radar.past`.
    pub fn latest_past_frame(&self) -> Result<&RadarFrame, RadarError> {
        let radar = self
            .radar
            .as_ref()
            .ok_or_else(|| RadarError::MalformedData("missing `radar` section".to_string()))?;

        radar
            .past
            .as_ref()
            .ok_or_else(|| RadarError::MalformedData("missing `radar.past` list".to_string()))?
            .last()
            .ok_or_else(|| RadarError::MalformedData("`radar.past` is empty".to_string()))
    }
}
