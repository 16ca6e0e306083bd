// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Balanced 2-d tree stored implicitly in one array.
//!
//! Building partitions the array around its median on alternating axes, so
//! the node of every sub-range sits at its middle index. No per-node
//! allocation and no rebalancing: the tree is built once per run and only
//! queried afterwards.

use nalgebra::Point2;

use super::SpatialIndex;
use crate::accumulator::BuildingId;

#[derive(Debug, Clone, Copy)]
struct Node {
    point: Point2<f64>,
    id: BuildingId,
}

/// Implicit k-d tree over 2D points.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
}

impl KdTree {
    /// Bulk-builds the tree in O(n log n).
    ///
    /// `points` and `ids` must have the same length; extra entries of the
    /// longer slice are ignored.
    pub fn build(points: &[Point2<f64>], ids: &[BuildingId]) -> Self {
        let mut nodes: Vec<Node> = points
            .iter()
            .zip(ids)
            .map(|(&point, &id)| Node { point, id })
            .collect();
        partition(&mut nodes, 0);
        Self { nodes }
    }

    fn collect_within(
        nodes: &[Node],
        axis: usize,
        center: &Point2<f64>,
        radius: f64,
        found: &mut Vec<BuildingId>,
    ) {
        if nodes.is_empty() {
            return;
        }
        let mid = nodes.len() / 2;
        let node = &nodes[mid];
        if (node.point - *center).norm_squared() <= radius * radius {
            found.push(node.id);
        }

        let split = node.point[axis];
        let next = 1 - axis;
        if center[axis] - radius <= split {
            Self::collect_within(&nodes[..mid], next, center, radius, found);
        }
        if center[axis] + radius >= split {
            Self::collect_within(&nodes[mid + 1..], next, center, radius, found);
        }
    }
}

/// Places the median (by `axis`) of `nodes` at its middle index and
/// recurses into both halves on the other axis.
fn partition(nodes: &mut [Node], axis: usize) {
    if nodes.len() <= 1 {
        return;
    }
    let mid = nodes.len() / 2;
    nodes.select_nth_unstable_by(mid, |a, b| a.point[axis].total_cmp(&b.point[axis]));
    let (left, rest) = nodes.split_at_mut(mid);
    partition(left, 1 - axis);
    partition(&mut rest[1..], 1 - axis);
}

impl SpatialIndex for KdTree {
    fn query_radius(&self, center: Point2<f64>, radius: f64) -> Vec<BuildingId> {
        let mut found = Vec::new();
        if radius >= 0.0 {
            Self::collect_within(&self.nodes, 0, &center, radius, &mut found);
        }
        found
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
