// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! R*-tree backend.

use nalgebra::Point2;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use super::SpatialIndex;
use crate::accumulator::BuildingId;

type TaggedPoint = GeomWithData<[f64; 2], BuildingId>;

/// `rstar` tree bulk-loaded with building vertices.
pub struct RTreeIndex {
    tree: RTree<TaggedPoint>,
}

impl RTreeIndex {
    pub fn build(points: &[Point2<f64>], ids: &[BuildingId]) -> Self {
        let tagged: Vec<TaggedPoint> = points
            .iter()
            .zip(ids)
            .map(|(p, &id)| GeomWithData::new([p.x, p.y], id))
            .collect();
        Self {
            tree: RTree::bulk_load(tagged),
        }
    }
}

impl SpatialIndex for RTreeIndex {
    fn query_radius(&self, center: Point2<f64>, radius: f64) -> Vec<BuildingId> {
        if radius < 0.0 {
            return Vec::new();
        }
        self.tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|tagged| tagged.data)
            .collect()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

impl std::fmt::Debug for RTreeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTreeIndex")
            .field("size", &self.tree.size())
            .finish()
    }
}
