// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buildings as seen by the engine: something with an optional footprint.

use nalgebra::Point2;

use crate::geometry::Polygon;

/// A building whose footprint edges may face a path.
pub trait Building {
    /// The footprint, if the building has a usable one.
    fn polygon(&self) -> Option<&Polygon>;

    /// Builds the footprint lazily. Called at the start of a run for
    /// buildings that report no polygon yet; a building that still has none
    /// afterwards is skipped for the run.
    fn init_polygon(&mut self) {}
}

impl Building for Polygon {
    fn polygon(&self) -> Option<&Polygon> {
        Some(self)
    }
}

impl Building for Option<Polygon> {
    fn polygon(&self) -> Option<&Polygon> {
        self.as_ref()
    }
}

/// A building holding its raw outline and validating it on first use.
#[derive(Debug, Clone, Default)]
pub struct Footprint {
    outline: Vec<Point2<f64>>,
    polygon: Option<Polygon>,
    attempted: bool,
}

impl Footprint {
    pub fn new(outline: Vec<Point2<f64>>) -> Self {
        Self {
            outline,
            polygon: None,
            attempted: false,
        }
    }

    /// Axis-aligned rectangle with corners `min` and `max`.
    pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    pub fn outline(&self) -> &[Point2<f64>] {
        &self.outline
    }
}

impl Building for Footprint {
    fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    fn init_polygon(&mut self) {
        if self.attempted {
            return;
        }
        self.attempted = true;
        match Polygon::new(self.outline.clone()) {
            Ok(polygon) => self.polygon = Some(polygon),
            Err(err) => {
                tracing::debug!(
                    vertices = self.outline.len(),
                    error = %err,
                    "Footprint has no usable polygon"
                );
            }
        }
    }
}
