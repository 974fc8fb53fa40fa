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

//! Planar geometry helpers for overlay data.
//!
//! Overlays are drawn in plate carrée, so clipping happens directly in
//! lon/lat against the map extent before anything is projected to pixels.

use crate::extent::MapExtent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Polygon with an outer ring and optional holes (lakes inside land).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<GeoPoint>,
    pub holes: Vec<Vec<GeoPoint>>,
}

/// Bounding box of a point sequence, `None` when empty.
#[must_use]
pub fn bounds(points: &[GeoPoint]) -> Option<MapExtent> {
    let first = points.first()?;
    let init = MapExtent {
        lon_min: first.lon,
        lon_max: first.lon,
        lat_min: first.lat,
        lat_max: first.lat,
    };
    Some(points.iter().fold(init, |b, p| MapExtent {
        lon_min: b.lon_min.min(p.lon),
        lon_max: b.lon_max.max(p.lon),
        lat_min: b.lat_min.min(p.lat),
        lat_max: b.lat_max.max(p.lat),
    }))
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Edge {
    fn inside(self, p: GeoPoint) -> bool {
        match self {
            Edge::Left(x) => p.lon >= x,
            Edge::Right(x) => p.lon <= x,
            Edge::Bottom(y) => p.lat >= y,
            Edge::Top(y) => p.lat <= y,
        }
    }

    fn intersect(self, a: GeoPoint, b: GeoPoint) -> GeoPoint {
        match self {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - a.lon) / (b.lon - a.lon);
                GeoPoint::new(x, a.lat + t * (b.lat - a.lat))
            }
            Edge::Bottom(y) | Edge::Top(y) => {
                let t = (y - a.lat) / (b.lat - a.lat);
                GeoPoint::new(a.lon + t * (b.lon - a.lon), y)
            }
        }
    }
}

/// Clip a closed ring to a rectangle (Sutherland-Hodgman).
///
/// The ring may or may not repeat its first point at the end. The result is
/// an open ring; it is empty when nothing of the polygon lies inside.
#[must_use]
pub fn clip_ring(ring: &[GeoPoint], window: &MapExtent) -> Vec<GeoPoint> {
    let mut output: Vec<GeoPoint> = ring.to_vec();
    if output.len() > 1 && output.first() == output.last() {
        output.pop();
    }

    let edges = [
        Edge::Left(window.lon_min),
        Edge::Right(window.lon_max),
        Edge::Bottom(window.lat_min),
        Edge::Top(window.lat_max),
    ];

    for edge in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &current in &input {
            match (edge.inside(current), edge.inside(prev)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(prev, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(prev, current)),
                (false, false) => {}
            }
            prev = current;
        }
    }

    if output.len() < 3 {
        output.clear();
    }
    output
}

/// Clip a segment to a rectangle (Liang-Barsky). Returns the visible part.
#[must_use]
pub fn clip_segment(a: GeoPoint, b: GeoPoint, window: &MapExtent) -> Option<(GeoPoint, GeoPoint)> {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let checks = [
        (-dx, a.lon - window.lon_min),
        (dx, window.lon_max - a.lon),
        (-dy, a.lat - window.lat_min),
        (dy, window.lat_max - a.lat),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    let at = |t: f64| GeoPoint::new(a.lon + t * dx, a.lat + t * dy);
    Some((at(t0), at(t1)))
}

/// Clip a polyline to a rectangle, splitting it wherever it leaves the
/// window. Each returned piece has at least two points.
#[must_use]
pub fn clip_polyline(line: &[GeoPoint], window: &MapExtent) -> Vec<Vec<GeoPoint>> {
    let mut pieces: Vec<Vec<GeoPoint>> = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();

    for pair in line.windows(2) {
        match clip_segment(pair[0], pair[1], window) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if current.len() >= 2 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if current.len() >= 2 {
                    pieces.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }

    if current.len() >= 2 {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_window() -> MapExtent {
        MapExtent {
            lon_min: 0.0,
            lon_max: 1.0,
            lat_min: 0.0,
            lat_max: 1.0,
        }
    }

    fn p(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat)
    }

    #[test]
    fn test_bounds() {
        assert!(bounds(&[]).is_none());
        let b = bounds(&[p(3.0, -1.0), p(-2.0, 4.0), p(0.0, 0.0)]).unwrap();
        assert_eq!((b.lon_min, b.lon_max, b.lat_min, b.lat_max), (-2.0, 3.0, -1.0, 4.0));
    }

    #[test]
    fn test_clip_ring_fully_inside_is_unchanged() {
        let ring = vec![p(0.2, 0.2), p(0.8, 0.2), p(0.8, 0.8), p(0.2, 0.2)];
        let clipped = clip_ring(&ring, &unit_window());
        assert_eq!(clipped, vec![p(0.2, 0.2), p(0.8, 0.2), p(0.8, 0.8)]);
    }

    #[test]
    fn test_clip_ring_covering_window_becomes_window() {
        let ring = vec![p(-5.0, -5.0), p(5.0, -5.0), p(5.0, 5.0), p(-5.0, 5.0)];
        let clipped = clip_ring(&ring, &unit_window());
        assert_eq!(clipped.len(), 4);
        for corner in [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)] {
            assert!(clipped.contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn test_clip_ring_outside_is_empty() {
        let ring = vec![p(2.0, 2.0), p(3.0, 2.0), p(3.0, 3.0)];
        assert!(clip_ring(&ring, &unit_window()).is_empty());
    }

    #[test]
    fn test_clip_segment_crossing() {
        let (a, b) = clip_segment(p(-1.0, 0.5), p(2.0, 0.5), &unit_window()).unwrap();
        assert_eq!(a, p(0.0, 0.5));
        assert_eq!(b, p(1.0, 0.5));
    }

    #[test]
    fn test_clip_segment_outside() {
        assert!(clip_segment(p(-1.0, 2.0), p(2.0, 2.0), &unit_window()).is_none());
        assert!(clip_segment(p(1.5, -1.0), p(1.5, 2.0), &unit_window()).is_none());
    }

    #[test]
    fn test_clip_polyline_splits_on_exit() {
        // in, out, back in
        let line = vec![p(0.1, 0.5), p(0.5, 0.5), p(0.5, 3.0), p(0.9, 3.0), p(0.9, 0.5)];
        let pieces = clip_polyline(&line, &unit_window());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], vec![p(0.1, 0.5), p(0.5, 0.5), p(0.5, 1.0)]);
        assert_eq!(pieces[1], vec![p(0.9, 1.0), p(0.9, 0.5)]);
    }

    #[test]
    fn test_clip_polyline_outside_is_empty() {
        let line = vec![p(5.0, 5.0), p(6.0, 6.0)];
        assert!(clip_polyline(&line, &unit_window()).is_empty());
    }
}
