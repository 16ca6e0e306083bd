// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat vertex buffer over all footprints of a run.
//!
//! Vertices of every building with a polygon are laid out back to back. Two
//! lookups hang off the buffer:
//! - flat vertex index -> owning building (what the spatial index reports)
//! - building -> range of its vertices (what the sweep reads edges from)

use std::ops::Range;

use nalgebra::Point2;

use crate::accumulator::BuildingId;
use crate::building::Building;

#[derive(Debug, Clone, Default)]
pub struct VertexBuffer {
    points: Vec<Point2<f64>>,
    owners: Vec<BuildingId>,
    ranges: Vec<Option<Range<usize>>>,
}

impl VertexBuffer {
    /// Lays out the footprint vertices of `buildings` in slice order.
    /// Buildings without a polygon get no range.
    pub fn from_buildings<B: Building>(buildings: &[B]) -> Self {
        let total: usize = buildings
            .iter()
            .filter_map(|b| b.polygon())
            .map(|p| p.n())
            .sum();

        let mut points = Vec::with_capacity(total);
        let mut owners = Vec::with_capacity(total);
        let mut ranges = Vec::with_capacity(buildings.len());

        for (id, building) in buildings.iter().enumerate() {
            match building.polygon() {
                Some(polygon) => {
                    let start = points.len();
                    points.extend_from_slice(polygon.verts());
                    owners.extend(std::iter::repeat(id).take(polygon.n()));
                    ranges.push(Some(start..points.len()));
                }
                None => ranges.push(None),
            }
        }

        Self {
            points,
            owners,
            ranges,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Owning building of every vertex, parallel to [`Self::points`].
    pub fn owners(&self) -> &[BuildingId] {
        &self.owners
    }

    pub fn owner(&self, vertex: usize) -> Option<BuildingId> {
        self.owners.get(vertex).copied()
    }

    /// Offset and extent of a building's vertices.
    pub fn range(&self, building: BuildingId) -> Option<Range<usize>> {
        self.ranges.get(building).cloned().flatten()
    }

    /// A building's vertices in winding order (empty if it has none).
    pub fn vertices(&self, building: BuildingId) -> &[Point2<f64>] {
        match self.range(building) {
            Some(range) => &self.points[range],
            None => &[],
        }
    }

    /// Number of buildings that contributed vertices.
    pub fn building_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }
}
