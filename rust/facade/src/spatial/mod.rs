// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point indexes over footprint vertices.
//!
//! Every indexed point carries the id of the building it belongs to. A radius
//! query reports the id once per matching point, so a building with several
//! vertices in range shows up several times; callers de-duplicate.
//!
//! Two backends answer the same queries:
//! - [`KdTree`]: balanced 2-d tree built once by median selection
//! - [`RTreeIndex`]: bulk-loaded `rstar` R*-tree

mod kdtree;
mod rtree;

pub use kdtree::KdTree;
pub use rtree::RTreeIndex;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::accumulator::BuildingId;
use crate::error::{Error, Result};

/// Radius queries over building vertices.
pub trait SpatialIndex: Send + Sync {
    /// Ids of every indexed point within `radius` of `center` (inclusive).
    fn query_radius(&self, center: Point2<f64>, radius: f64) -> Vec<BuildingId>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which index implementation a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    KdTree,
    RTree,
}

impl IndexBackend {
    /// Parses `kdtree` / `rtree` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "kdtree" | "kd-tree" | "kd" => Some(IndexBackend::KdTree),
            "rtree" | "r-tree" | "rstar" => Some(IndexBackend::RTree),
            _ => None,
        }
    }
}

/// Builds the selected backend over `points`, tagging point `i` with `ids[i]`.
pub fn build_index(
    backend: IndexBackend,
    points: &[Point2<f64>],
    ids: &[BuildingId],
) -> Result<Box<dyn SpatialIndex>> {
    if points.len() != ids.len() {
        return Err(Error::InvalidInput(format!(
            "{} points but {} ids",
            points.len(),
            ids.len()
        )));
    }
    Ok(match backend {
        IndexBackend::KdTree => Box::new(KdTree::build(points, ids)),
        IndexBackend::RTree => Box::new(RTreeIndex::build(points, ids)),
    })
}
