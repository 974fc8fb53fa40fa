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

//! Visual style of the rendered map.
//!
//! Sizes are kept in typographic points and converted to pixels with the
//! figure DPI, so the same style renders proportionally at any resolution.

use image::Rgba;

/// Stroke style for an overlay layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgba<u8>,
    /// Line width in points
    pub width_pt: f32,
    /// Dash `(on, off)` lengths in multiples of the line width
    pub dash: Option<(f32, f32)>,
}

impl LineStyle {
    #[must_use]
    pub const fn solid(color: Rgba<u8>, width_pt: f32) -> Self {
        Self {
            color,
            width_pt,
            dash: None,
        }
    }

    /// Dashed line with the usual `--` pattern (3.7 on, 1.6 off)
    #[must_use]
    pub const fn dashed(color: Rgba<u8>, width_pt: f32) -> Self {
        Self {
            color,
            width_pt,
            dash: Some((3.7, 1.6)),
        }
    }
}

/// Colours, sizes and layout of a map figure
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    /// Figure edge in inches (figures are square)
    pub figure_inches: f32,
    pub dpi: f32,

    pub background: Rgba<u8>,
    pub text: Rgba<u8>,
    pub tick: Rgba<u8>,
    pub land: Rgba<u8>,

    pub frame: LineStyle,
    pub coastline: LineStyle,
    pub borders: LineStyle,
    pub provinces: LineStyle,

    /// Opacity applied on top of the tile's own alpha
    pub radar_opacity: f32,

    /// Ticks per axis, evenly spaced over the extent
    pub tick_count: usize,
    pub tick_length_pt: f32,
    pub tick_width_pt: f32,
    pub tick_pad_pt: f32,
    pub label_size_pt: f32,

    pub title_size_pt: f32,
    pub title_pad_pt: f32,

    /// Padding kept around the drawn content when cropping, in inches
    pub tight_pad_inches: f32,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            figure_inches: 10.0,
            dpi: 300.0,
            background: rgb(0x0e, 0x11, 0x11),
            text: rgb(255, 255, 255),
            tick: rgb(255, 255, 255),
            land: rgb(0x3a, 0x3a, 0x3a),
            frame: LineStyle::solid(rgb(0, 0, 0), 0.8),
            coastline: LineStyle::solid(rgb(0, 0, 0), 0.8),
            borders: LineStyle::solid(rgb(0, 0, 0), 0.6),
            provinces: LineStyle::dashed(rgb(0x80, 0x80, 0x80), 0.5),
            radar_opacity: 0.8,
            tick_count: 9,
            tick_length_pt: 3.5,
            tick_width_pt: 0.8,
            tick_pad_pt: 3.5,
            label_size_pt: 10.0,
            title_size_pt: 12.0,
            title_pad_pt: 6.0,
            tight_pad_inches: 0.1,
        }
    }
}

impl MapStyle {
    /// Convert points to pixels at this style's DPI
    #[must_use]
    pub fn px(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }

    /// Figure edge in pixels
    #[must_use]
    pub fn figure_px(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "positive, bounded figure size")]
        let px = (self.figure_inches * self.dpi).round() as u32;
        px.max(1)
    }

    /// Pixels per metre for the PNG `pHYs` chunk
    #[must_use]
    pub fn pixels_per_meter(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "positive, bounded density")]
        let ppm = (self.dpi / 0.0254).round() as u32;
        ppm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_figure_is_ten_inches_at_300_dpi() {
        let style = MapStyle::default();
        assert_eq!(style.figure_px(), 3000);
        assert_eq!(style.pixels_per_meter(), 11811);
    }

    #[test]
    fn test_points_to_pixels() {
        let style = MapStyle::default();
        assert!((style.px(72.0) - 300.0).abs() < 1e-3);
        assert!((style.px(0.8) - 3.333).abs() < 1e-2);
    }

    #[test]
    fn test_province_lines_are_dashed() {
        let style = MapStyle::default();
        assert!(style.provinces.dash.is_some());
        assert!(style.coastline.dash.is_none());
        assert!((style.radar_opacity - 0.8).abs() < f32::EPSILON);
    }
}
