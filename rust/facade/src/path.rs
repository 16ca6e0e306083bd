// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Paths (streets, footways) and the provider that feeds their segments
//! to the engine.

use nalgebra::Point2;

use crate::geometry::PathSegment;

/// A polyline path through the street network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    points: Vec<Point2<f64>>,
}

impl Path {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// One segment per pair of consecutive points. Zero-length spans
    /// (repeated way nodes) are skipped.
    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.points
            .windows(2)
            .filter_map(|pair| PathSegment::from_endpoints(pair[0], pair[1]))
    }

    /// Total length along the polyline.
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length).sum()
    }
}

/// Supplies every segment of every path of a network.
pub trait PathNetwork {
    fn segments(&self) -> Box<dyn Iterator<Item = PathSegment> + '_>;
}

impl PathNetwork for [Path] {
    fn segments(&self) -> Box<dyn Iterator<Item = PathSegment> + '_> {
        Box::new(self.iter().flat_map(|path| path.segments()))
    }
}

impl PathNetwork for [PathSegment] {
    fn segments(&self) -> Box<dyn Iterator<Item = PathSegment> + '_> {
        Box::new(self.iter().copied())
    }
}

impl<T> PathNetwork for Vec<T>
where
    [T]: PathNetwork,
{
    fn segments(&self) -> Box<dyn Iterator<Item = PathSegment> + '_> {
        self.as_slice().segments()
    }
}
