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

//! Degree labels for axis ticks.

/// Magnitude with one decimal, rounded from the exact binary value with
/// ties to even.
fn tenths(value: f64) -> String {
    format!("{:.1}", value.abs())
}

/// Longitude label such as `121.7°E` or `69.8°W`.
///
/// Values are wrapped into `[-180, 180)`. The prime meridian is labelled
/// `0.0°E` and the antimeridian `180.0°` with no hemisphere.
#[must_use]
pub fn format_longitude(lon: f64) -> String {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    let text = tenths(wrapped);

    if text == "0.0" {
        "0.0°E".to_string()
    } else if text == "180.0" {
        "180.0°".to_string()
    } else if wrapped > 0.0 {
        format!("{text}°E")
    } else {
        format!("{text}°W")
    }
}

/// Latitude label such as `15.7°N` or `33.9°S`. The equator is `0.0°`.
#[must_use]
pub fn format_latitude(lat: f64) -> String {
    let text = tenths(lat);

    if text == "0.0" {
        "0.0°".to_string()
    } else if lat > 0.0 {
        format!("{text}°N")
    } else {
        format!("{text}°S")
    }
}
