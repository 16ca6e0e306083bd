// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint polygons, path segments and the segment-local frame.

use nalgebra::{Matrix2, Point2, Vector2};

use crate::error::{Error, Result};

/// Coordinates closer than this are treated as the same point.
pub const EPSILON: f64 = 1e-9;

/// A validated building footprint.
///
/// Vertices are stored counter-clockwise without a repeated closing vertex.
/// Straight-angle vertices are removed so every edge is a real facade side.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    verts: Vec<Point2<f64>>,
}

impl Polygon {
    /// Builds a footprint from a raw outline.
    ///
    /// The outline may repeat its first vertex at the end and may use either
    /// winding.
    pub fn new(outline: Vec<Point2<f64>>) -> Result<Self> {
        if outline.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidPolygon(
                "outline has non-finite coordinates".to_string(),
            ));
        }

        let mut verts: Vec<Point2<f64>> = Vec::with_capacity(outline.len());
        for p in outline {
            if verts.last().map_or(true, |last| (p - *last).norm() > EPSILON) {
                verts.push(p);
            }
        }
        while verts.len() > 1 && (verts[0] - verts[verts.len() - 1]).norm() <= EPSILON {
            verts.pop();
        }

        remove_straight_angles(&mut verts);

        if verts.len() < 3 {
            return Err(Error::InvalidPolygon(format!(
                "footprint needs at least 3 corners, got {}",
                verts.len()
            )));
        }

        let signed = signed_area(&verts);
        if signed.abs() <= EPSILON {
            return Err(Error::InvalidPolygon("footprint has zero area".to_string()));
        }
        if signed < 0.0 {
            verts.reverse();
        }

        Ok(Self { verts })
    }

    /// Number of vertices (and edges).
    pub fn n(&self) -> usize {
        self.verts.len()
    }

    pub fn verts(&self) -> &[Point2<f64>] {
        &self.verts
    }

    /// Endpoints of edge `i`.
    pub fn edge(&self, i: usize) -> (Point2<f64>, Point2<f64>) {
        let n = self.verts.len();
        (self.verts[i % n], self.verts[(i + 1) % n])
    }

    /// Iterates `(edge index, start, end)` in winding order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, Point2<f64>, Point2<f64>)> + '_ {
        (0..self.verts.len()).map(move |i| {
            let (a, b) = self.edge(i);
            (i, a, b)
        })
    }

    pub fn edge_length(&self, i: usize) -> f64 {
        let (a, b) = self.edge(i);
        (b - a).norm()
    }

    /// Enclosed area (always positive).
    pub fn area(&self) -> f64 {
        signed_area(&self.verts)
    }
}

/// Shoelace formula; positive for counter-clockwise rings.
fn signed_area(verts: &[Point2<f64>]) -> f64 {
    let n = verts.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

/// Drops vertices whose incoming and outgoing edges are collinear.
fn remove_straight_angles(verts: &mut Vec<Point2<f64>>) {
    loop {
        let n = verts.len();
        if n < 3 {
            return;
        }
        let kept: Vec<Point2<f64>> = (0..n)
            .filter(|&i| {
                let prev = verts[(i + n - 1) % n];
                let cur = verts[i];
                let next = verts[(i + 1) % n];
                let a = cur - prev;
                let b = next - cur;
                a.perp(&b).abs() > EPSILON * a.norm() * b.norm()
            })
            .map(|i| verts[i])
            .collect();
        if kept.len() == n {
            return;
        }
        *verts = kept;
    }
}

/// One straight piece of a path: its midpoint, unit direction and length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub center: Point2<f64>,
    pub direction: Vector2<f64>,
    pub length: f64,
}

impl PathSegment {
    /// Creates a segment, normalising `direction`.
    pub fn new(center: Point2<f64>, direction: Vector2<f64>, length: f64) -> Result<Self> {
        let norm = direction.norm();
        if !norm.is_finite() || norm <= EPSILON {
            return Err(Error::InvalidPath(format!(
                "direction {:?} has no usable length",
                direction
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidPath(format!("length {} is not positive", length)));
        }
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(Error::InvalidPath("center is not finite".to_string()));
        }
        Ok(Self {
            center,
            direction: direction / norm,
            length,
        })
    }

    /// Segment spanning `a` to `b`; `None` when the span has no length.
    pub fn from_endpoints(a: Point2<f64>, b: Point2<f64>) -> Option<Self> {
        let delta = b - a;
        let length = delta.norm();
        if !length.is_finite() || length <= EPSILON {
            return None;
        }
        Some(Self {
            center: nalgebra::center(&a, &b),
            direction: delta / length,
            length,
        })
    }

    pub fn start(&self) -> Point2<f64> {
        self.center - self.direction * (self.length / 2.0)
    }

    pub fn end(&self) -> Point2<f64> {
        self.center + self.direction * (self.length / 2.0)
    }
}

/// Coordinate frame of one path segment.
///
/// The origin sits at the segment center, x runs along the segment and
/// y along `(u.y, -u.x)`, so positive y lies to the right of travel.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: Point2<f64>,
    rotation: Matrix2<f64>,
}

impl LocalFrame {
    pub fn new(segment: &PathSegment) -> Self {
        let u = segment.direction;
        Self {
            origin: segment.center,
            rotation: Matrix2::new(u.x, u.y, u.y, -u.x),
        }
    }

    /// Maps a world point into segment-local coordinates.
    pub fn to_local(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::from(self.rotation * (*p - self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_polygon_normalises_winding() {
        let mut clockwise = square(0.0, 0.0, 2.0);
        clockwise.reverse();
        let poly = Polygon::new(clockwise).unwrap();

        assert_eq!(poly.n(), 4);
        assert_relative_eq!(poly.area(), 4.0);
    }

    #[test]
    fn test_polygon_drops_closing_vertex_and_straight_angles() {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(0.0, 0.0),
        ];
        let poly = Polygon::new(outline).unwrap();

        assert_eq!(poly.n(), 4);
        for i in 0..poly.n() {
            assert_relative_eq!(poly.edge_length(i), 2.0);
        }
    }

    #[test]
    fn test_polygon_rejects_degenerate_outlines() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(matches!(Polygon::new(line), Err(Error::InvalidPolygon(_))));

        let two = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(Polygon::new(two).is_err());

        let nan = vec![
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(Polygon::new(nan).is_err());
    }

    #[test]
    fn test_polygon_edges_wrap_around() {
        let poly = Polygon::new(square(0.0, 0.0, 1.0)).unwrap();
        let edges: Vec<_> = poly.edges().collect();

        assert_eq!(edges.len(), 4);
        let (idx, a, b) = edges[3];
        assert_eq!(idx, 3);
        assert_eq!(a, Point2::new(0.0, 1.0));
        assert_eq!(b, Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_segment_normalises_direction() {
        let seg = PathSegment::new(Point2::new(1.0, 1.0), Vector2::new(0.0, 3.0), 4.0).unwrap();

        assert_relative_eq!(seg.direction.norm(), 1.0);
        assert_relative_eq!(seg.start(), Point2::new(1.0, -1.0));
        assert_relative_eq!(seg.end(), Point2::new(1.0, 3.0));
    }

    #[test]
    fn test_segment_rejects_bad_input() {
        let c = Point2::new(0.0, 0.0);
        assert!(PathSegment::new(c, Vector2::zeros(), 1.0).is_err());
        assert!(PathSegment::new(c, Vector2::x(), 0.0).is_err());
        assert!(PathSegment::new(c, Vector2::x(), f64::INFINITY).is_err());
        assert!(PathSegment::from_endpoints(c, c).is_none());
    }

    #[test]
    fn test_local_frame_axes() {
        let seg = PathSegment::from_endpoints(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0)).unwrap();
        let frame = LocalFrame::new(&seg);

        // Along the segment maps to +x.
        assert_relative_eq!(frame.to_local(&Point2::new(0.0, 8.0)), Point2::new(3.0, 0.0));
        // Right of travel (heading +y, so +x world) maps to +y.
        assert_relative_eq!(frame.to_local(&Point2::new(2.0, 5.0)), Point2::new(0.0, 2.0));
    }
}
