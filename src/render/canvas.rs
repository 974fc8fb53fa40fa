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

//! Raster drawing primitives on top of `imageproc`.
//!
//! Coordinates are floating point pixels with the origin at the top left.
//! Callers clip geometry to the visible area first; the primitives here only
//! guard against degenerate shapes.

use ab_glyph::{FontRef, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Axis-aligned pixel rectangle used for layout and tight cropping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PixelRect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    #[must_use]
    pub fn padded(&self, pad: f32) -> PixelRect {
        PixelRect::new(self.x - pad, self.y - pad, self.width + 2.0 * pad, self.height + 2.0 * pad)
    }
}

#[allow(clippy::cast_possible_truncation, reason = "pixel coordinates fit in i32")]
fn to_i32(v: f32) -> i32 {
    v.round() as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to non-negative first")]
fn to_u32(v: f32) -> u32 {
    v.round().max(0.0) as u32
}

/// Image being drawn on
#[derive(Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Canvas of the given size filled with `background`.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    /// Fill a closed ring. The ring may repeat its first point.
    pub fn fill_ring(&mut self, ring: &[(f32, f32)], color: Rgba<u8>) {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.len());
        for &(x, y) in ring {
            let p = Point::new(to_i32(x), to_i32(y));
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return;
        }
        draw_polygon_mut(&mut self.image, &points, color);
    }

    /// Fill an axis-aligned rectangle; parts outside the canvas are dropped.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        let w = to_u32(rect.width).max(1);
        let h = to_u32(rect.height).max(1);
        draw_filled_rect_mut(&mut self.image, Rect::at(to_i32(rect.x), to_i32(rect.y)).of_size(w, h), color);
    }

    /// Stroke an open polyline `width` pixels wide.
    ///
    /// `dash` is an `(on, off)` pattern in pixels that continues across
    /// vertices.
    pub fn stroke(&mut self, line: &[(f32, f32)], width: f32, color: Rgba<u8>, dash: Option<(f32, f32)>) {
        if line.len() < 2 {
            return;
        }
        match dash {
            Some((on, off)) if on > 0.0 && off > 0.0 => {
                for piece in dash_pieces(line, on, off) {
                    self.stroke_solid(&piece, width, color);
                }
            }
            _ => self.stroke_solid(line, width, color),
        }
    }

    fn stroke_solid(&mut self, line: &[(f32, f32)], width: f32, color: Rgba<u8>) {
        let half = width / 2.0;
        for pair in line.windows(2) {
            self.thick_segment(pair[0], pair[1], half, color);
        }
        // round joins
        if half >= 1.0 {
            let radius = to_i32(half);
            for &(x, y) in &line[1..line.len() - 1] {
                draw_filled_circle_mut(&mut self.image, (to_i32(x), to_i32(y)), radius, color);
            }
        }
    }

    fn thick_segment(&mut self, a: (f32, f32), b: (f32, f32), half: f32, color: Rgba<u8>) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = dx.hypot(dy);
        if len == 0.0 {
            return;
        }
        if half < 1.0 {
            draw_line_segment_mut(&mut self.image, a, b, color);
            return;
        }
        let (nx, ny) = (-dy / len * half, dx / len * half);
        let quad = [
            Point::new(to_i32(a.0 + nx), to_i32(a.1 + ny)),
            Point::new(to_i32(b.0 + nx), to_i32(b.1 + ny)),
            Point::new(to_i32(b.0 - nx), to_i32(b.1 - ny)),
            Point::new(to_i32(a.0 - nx), to_i32(a.1 - ny)),
        ];
        if quad[0] == quad[3] || quad[0] == quad[1] {
            draw_line_segment_mut(&mut self.image, a, b, color);
        } else {
            draw_polygon_mut(&mut self.image, &quad, color);
        }
    }

    /// Alpha-blend `src` with its top left corner at `(x, y)`, scaling the
    /// source alpha by `opacity`.
    pub fn blend_image(&mut self, src: &RgbaImage, x: i64, y: i64, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let (cw, ch) = (i64::from(self.image.width()), i64::from(self.image.height()));
        for (sx, sy, pixel) in src.enumerate_pixels() {
            let (dx, dy) = (x + i64::from(sx), y + i64::from(sy));
            if dx < 0 || dy < 0 || dx >= cw || dy >= ch {
                continue;
            }
            let alpha = f32::from(pixel[3]) / 255.0 * opacity;
            if alpha <= 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "bounds checked above")]
            let dst = self.image.get_pixel_mut(dx as u32, dy as u32);
            *dst = blend(*dst, *pixel, alpha);
        }
    }

    /// Draw text with its top left corner at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, scale: PxScale, font: &FontRef<'_>, text: &str, color: Rgba<u8>) {
        draw_text_mut(&mut self.image, color, to_i32(x), to_i32(y), scale, font, text);
    }

    /// Copy out `rect`, filling anything beyond the canvas with `background`.
    #[must_use]
    pub fn crop(&self, rect: PixelRect, background: Rgba<u8>) -> RgbaImage {
        let mut out = RgbaImage::from_pixel(to_u32(rect.width).max(1), to_u32(rect.height).max(1), background);
        imageops::replace(&mut out, &self.image, -i64::from(to_i32(rect.x)), -i64::from(to_i32(rect.y)));
        out
    }
}

/// Width and height of `text` rendered at `scale`
#[must_use]
pub fn measure_text(scale: PxScale, font: &FontRef<'_>, text: &str) -> (f32, f32) {
    let (w, h) = text_size(scale, font, text);
    #[allow(clippy::cast_precision_loss, reason = "text extents are small")]
    let size = (w as f32, h as f32);
    size
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let mix = |d: u8, s: u8| -> u8 {
        let v = f32::from(s) * alpha + f32::from(d) * (1.0 - alpha);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to u8 range")]
        let out = v.round().clamp(0.0, 255.0) as u8;
        out
    };
    let out_alpha = alpha + f32::from(dst[3]) / 255.0 * (1.0 - alpha);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to u8 range")]
    let a = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), a])
}

/// Split a polyline into the "on" stretches of a dash pattern.
fn dash_pieces(line: &[(f32, f32)], on: f32, off: f32) -> Vec<Vec<(f32, f32)>> {
    let mut pieces = Vec::new();
    let mut current: Vec<(f32, f32)> = vec![line[0]];
    let mut drawing = true;
    let mut remaining = on;

    for pair in line.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = (b.0 - a.0).hypot(b.1 - a.1);
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = ((b.0 - a.0) / len, (b.1 - a.1) / len);
        let mut travelled = 0.0;

        while len - travelled > remaining {
            travelled += remaining;
            let p = (a.0 + ux * travelled, a.1 + uy * travelled);
            if drawing {
                current.push(p);
                pieces.push(std::mem::take(&mut current));
                remaining = off;
            } else {
                current = vec![p];
                remaining = on;
            }
            drawing = !drawing;
        }

        remaining -= len - travelled;
        if drawing {
            current.push(b);
        }
    }

    if drawing && current.len() >= 2 {
        pieces.push(current);
    }
    pieces
}
