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

//! Map figure rendering.
//!
//! A figure is a square canvas with one map axes in the middle. The axes
//! show the radar tile stretched over its geographic extent in plate carrée,
//! with land, coastlines and borders around it, degree ticks on the left and
//! bottom edges, and a timestamp title on top. Saving crops the figure to
//! its drawn content and writes a PNG tagged with the figure DPI.

pub mod canvas;
pub mod style;
pub mod ticks;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontRef, PxScale};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, info};
use rainviewer_client::{RadarError, TileImage};

use crate::extent::MapExtent;
use crate::geometry::{clip_polyline, clip_ring, GeoPoint};
use crate::natural_earth::{FeatureLayer, FeatureSource, Layer};
use crate::output::{output_filename, title};

use self::canvas::{measure_text, Canvas, PixelRect};
use self::style::{LineStyle, MapStyle};
use self::ticks::{format_latitude, format_longitude};

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Default subplot box as fractions of the figure: left, right, bottom, top.
const SUBPLOT_BOX: (f32, f32, f32, f32) = (0.125, 0.9, 0.11, 0.88);

/// What a figure shows: the tile's centre point, zoom and capture time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub timestamp: i64,
}

impl MapView {
    #[must_use]
    pub fn extent(&self) -> MapExtent {
        MapExtent::around(self.lat, self.lon, self.zoom)
    }
}

/// Overlay geometry for one map, already reduced to the visible extent
#[derive(Debug, Clone, Default)]
pub struct Overlays {
    pub land: FeatureLayer,
    pub coastline: FeatureLayer,
    pub borders: FeatureLayer,
    pub provinces: FeatureLayer,
}

impl Overlays {
    /// Load every layer from `source` and keep what touches `extent`.
    pub fn load(source: &impl FeatureSource, extent: &MapExtent) -> Result<Self, RadarError> {
        let mut overlays = Overlays::default();
        for layer in Layer::ALL {
            let features = source.load(layer, extent)?.within(extent);
            debug!(
                "{} features in view: {} polygons, {} lines",
                layer.dataset(extent),
                features.polygons.len(),
                features.lines.len()
            );
            match layer {
                Layer::Land => overlays.land = features,
                Layer::Coastline => overlays.coastline = features,
                Layer::Borders => overlays.borders = features,
                Layer::Provinces => overlays.provinces = features,
            }
        }
        Ok(overlays)
    }
}

/// A rendered figure. The pixel buffer is released when it goes out of scope.
#[derive(Debug)]
pub struct Figure {
    image: RgbaImage,
    pixels_per_meter: u32,
}

impl Figure {
    /// Write the figure as an RGBA PNG with a physical DPI chunk.
    pub fn save_png(&self, path: &Path) -> Result<(), RadarError> {
        let file = File::create(path)
            .map_err(|e| RadarError::Render(format!("cannot create {}: {e}", path.display())))?;
        let (width, height) = self.image.dimensions();

        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: self.pixels_per_meter,
            yppu: self.pixels_per_meter,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder
            .write_header()
            .map_err(|e| RadarError::Render(format!("PNG header: {e}")))?;
        writer
            .write_image_data(self.image.as_raw())
            .map_err(|e| RadarError::Render(format!("PNG data: {e}")))?;
        writer
            .finish()
            .map_err(|e| RadarError::Render(format!("PNG finish: {e}")))?;
        Ok(())
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        let (width, height) = self.image.dimensions();
        debug!("Releasing {width}x{height} figure");
    }
}

/// Pixel placement of the map axes inside the figure
#[derive(Debug, Clone, Copy)]
struct Axes {
    rect: PixelRect,
    extent: MapExtent,
}

impl Axes {
    /// Fit an equal-aspect axes, centred, inside the default subplot box.
    fn layout(figure_px: f32, extent: MapExtent) -> Self {
        let (left, right, bottom, top) = SUBPLOT_BOX;
        let box_w = (right - left) * figure_px;
        let box_h = (top - bottom) * figure_px;

        #[allow(clippy::cast_possible_truncation, reason = "aspect ratio of a small extent")]
        let aspect = (extent.height() / extent.width()) as f32;
        let (w, h) = if box_h / box_w > aspect {
            (box_w, box_w * aspect)
        } else {
            (box_h / aspect, box_h)
        };

        let x = left * figure_px + (box_w - w) / 2.0;
        let y = (1.0 - top) * figure_px + (box_h - h) / 2.0;
        Self {
            rect: PixelRect::new(x, y, w, h),
            extent,
        }
    }

    #[allow(clippy::cast_possible_truncation, reason = "projected into figure pixels")]
    fn x(&self, lon: f64) -> f32 {
        let t = (lon - self.extent.lon_min) / self.extent.width();
        self.rect.x + (t as f32) * self.rect.width
    }

    #[allow(clippy::cast_possible_truncation, reason = "projected into figure pixels")]
    fn y(&self, lat: f64) -> f32 {
        let t = (self.extent.lat_max - lat) / self.extent.height();
        self.rect.y + (t as f32) * self.rect.height
    }

    fn project(&self, points: &[GeoPoint]) -> Vec<(f32, f32)> {
        points.iter().map(|p| (self.x(p.lon), self.y(p.lat))).collect()
    }
}

/// Draws radar figures with a bundled font and a fixed style
pub struct MapRenderer {
    style: MapStyle,
    font: FontRef<'static>,
}

impl std::fmt::Debug for MapRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRenderer")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl MapRenderer {
    pub fn new(style: MapStyle) -> Result<Self, RadarError> {
        let font = FontRef::try_from_slice(FONT_DATA).map_err(|e| RadarError::Render(format!("font: {e}")))?;
        Ok(Self { style, font })
    }

    /// Font scale for a size in points at the style's DPI.
    fn font_scale(&self, points: f32) -> Result<PxScale, RadarError> {
        let units_per_em = self
            .font
            .units_per_em()
            .ok_or_else(|| RadarError::Render("font has no units per em".to_string()))?;
        Ok(PxScale::from(self.style.px(points) * self.font.height_unscaled() / units_per_em))
    }

    /// Render the map for `tile` and, with `save_dir`, write it there.
    ///
    /// Returns the written path. The figure is released before returning,
    /// whether or not saving succeeded.
    pub fn render_map(
        &self,
        tile: &TileImage,
        view: &MapView,
        overlays: &Overlays,
        save_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>, RadarError> {
        let figure = self.render(tile, view, overlays)?;
        let Some(dir) = save_dir else {
            return Ok(None);
        };

        let path = dir.join(output_filename(view.timestamp, view.zoom)?);
        figure.save_png(&path)?;
        info!("Saved image as {}", path.display());
        Ok(Some(path))
    }

    /// Draw the figure and crop it to its content.
    pub fn render(&self, tile: &TileImage, view: &MapView, overlays: &Overlays) -> Result<Figure, RadarError> {
        let style = &self.style;
        let size = style.figure_px();
        #[allow(clippy::cast_precision_loss, reason = "figure sizes are small")]
        let axes = Axes::layout(size as f32, view.extent());

        let mut canvas = Canvas::new(size, size, style.background);
        debug!("Rendering {size}x{size} figure, axes {:?}", axes.rect);

        self.draw_land(&mut canvas, &axes, &overlays.land);
        self.draw_radar(&mut canvas, &axes, tile);
        for (layer, line) in [
            (&overlays.coastline, style.coastline),
            (&overlays.borders, style.borders),
            (&overlays.provinces, style.provinces),
        ] {
            self.draw_lines(&mut canvas, &axes, layer, line);
        }
        self.draw_frame(&mut canvas, &axes);

        let mut content = axes.rect.padded(style.px(style.frame.width_pt) / 2.0);
        content = content.union(&self.draw_ticks(&mut canvas, &axes)?);
        content = content.union(&self.draw_title(&mut canvas, &axes, view.timestamp)?);

        let bounds = content.padded(style.tight_pad_inches * style.dpi);
        Ok(Figure {
            image: canvas.crop(bounds, style.background),
            pixels_per_meter: style.pixels_per_meter(),
        })
    }

    fn draw_land(&self, canvas: &mut Canvas, axes: &Axes, land: &FeatureLayer) {
        for polygon in &land.polygons {
            let exterior = clip_ring(&polygon.exterior, &axes.extent);
            if exterior.is_empty() {
                continue;
            }
            canvas.fill_ring(&axes.project(&exterior), self.style.land);
            for hole in &polygon.holes {
                let hole = clip_ring(hole, &axes.extent);
                if !hole.is_empty() {
                    canvas.fill_ring(&axes.project(&hole), self.style.background);
                }
            }
        }
    }

    fn draw_radar(&self, canvas: &mut Canvas, axes: &Axes, tile: &TileImage) {
        let w = axes.rect.width.round().max(1.0);
        let h = axes.rect.height.round().max(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "positive axes size")]
        let stretched = imageops::resize(tile.pixels(), w as u32, h as u32, FilterType::Nearest);
        #[allow(clippy::cast_possible_truncation, reason = "axes origin is inside the figure")]
        let (x, y) = (axes.rect.x.round() as i64, axes.rect.y.round() as i64);
        canvas.blend_image(&stretched, x, y, self.style.radar_opacity);
    }

    fn draw_lines(&self, canvas: &mut Canvas, axes: &Axes, layer: &FeatureLayer, line: LineStyle) {
        let width = self.style.px(line.width_pt);
        let dash = line
            .dash
            .map(|(on, off)| (self.style.px(on * line.width_pt), self.style.px(off * line.width_pt)));

        let rings = layer.polygons.iter().map(|p| &p.exterior);
        for points in layer.lines.iter().chain(rings) {
            for piece in clip_polyline(points, &axes.extent) {
                canvas.stroke(&axes.project(&piece), width, line.color, dash);
            }
        }
    }

    fn draw_frame(&self, canvas: &mut Canvas, axes: &Axes) {
        let width = self.style.px(self.style.frame.width_pt);
        let r = axes.rect;
        let corners = [
            (r.x, r.y),
            (r.right(), r.y),
            (r.right(), r.bottom()),
            (r.x, r.bottom()),
            (r.x, r.y),
        ];
        canvas.stroke(&corners, width, self.style.frame.color, None);
    }

    /// Tick marks and degree labels on the bottom and left edges. Returns
    /// the area they cover.
    fn draw_ticks(&self, canvas: &mut Canvas, axes: &Axes) -> Result<PixelRect, RadarError> {
        let style = &self.style;
        let scale = self.font_scale(style.label_size_pt)?;
        let length = style.px(style.tick_length_pt);
        let width = style.px(style.tick_width_pt);
        let pad = style.px(style.tick_pad_pt);
        let r = axes.rect;
        let mut covered = r;

        for lon in axes.extent.lon_ticks(style.tick_count) {
            let x = axes.x(lon);
            canvas.fill_rect(PixelRect::new(x - width / 2.0, r.bottom(), width, length), style.tick);

            let label = format_longitude(lon);
            let (tw, th) = measure_text(scale, &self.font, &label);
            let at = PixelRect::new(x - tw / 2.0, r.bottom() + length + pad, tw, th);
            canvas.text(at.x, at.y, scale, &self.font, &label, style.text);
            covered = covered.union(&at);
        }

        for lat in axes.extent.lat_ticks(style.tick_count) {
            let y = axes.y(lat);
            canvas.fill_rect(PixelRect::new(r.x - length, y - width / 2.0, length, width), style.tick);

            let label = format_latitude(lat);
            let (tw, th) = measure_text(scale, &self.font, &label);
            let at = PixelRect::new(r.x - length - pad - tw, y - th / 2.0, tw, th);
            canvas.text(at.x, at.y, scale, &self.font, &label, style.text);
            covered = covered.union(&at);
        }

        Ok(covered)
    }

    fn draw_title(&self, canvas: &mut Canvas, axes: &Axes, timestamp: i64) -> Result<PixelRect, RadarError> {
        let style = &self.style;
        let scale = self.font_scale(style.title_size_pt)?;
        let text = title(timestamp)?;
        let (tw, th) = measure_text(scale, &self.font, &text);

        let r = axes.rect;
        let at = PixelRect::new(r.x + (r.width - tw) / 2.0, r.y - style.px(style.title_pad_pt) - th, tw, th);
        canvas.text(at.x, at.y, scale, &self.font, &text, style.text);
        Ok(at)
    }
}
