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

//! Names and captions derived from a radar timestamp. All times are UTC.

use chrono::{DateTime, Utc};
use rainviewer_client::RadarError;

fn utc(timestamp: i64) -> Result<DateTime<Utc>, RadarError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| RadarError::MalformedData(format!("timestamp {timestamp} is out of range")))
}

/// Output file name, e.g. `radar_20231114_2213_z7.png`
pub fn output_filename(timestamp: i64, zoom: u8) -> Result<String, RadarError> {
    Ok(format!("radar_{}_z{zoom}.png", utc(timestamp)?.format("%Y%m%d_%H%M")))
}

/// Figure title, e.g. `Radar @ 2023-11-14 22:13Z`
pub fn title(timestamp: i64) -> Result<String, RadarError> {
    Ok(format!("Radar @ {}Z", utc(timestamp)?.format("%Y-%m-%d %H:%M")))
}
