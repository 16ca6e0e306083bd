// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Facade Visibility
//!
//! Estimates how much of every building facade can be seen from the street.
//!
//! For each segment of each path the engine gathers nearby footprints from a
//! point index, moves them into the segment's local frame and runs a
//! sweep-line over their edges. Where edges overlap along the segment only
//! the one nearest to the path counts as visible; the lengths it is visible
//! for are accumulated per edge across all segments of a run.
//!
//! ```no_run
//! use facade_visibility::{
//!     EdgeVisibility, FacadeVisibility, Footprint, Path, Point2, VisibilityConfig,
//! };
//!
//! let mut buildings = vec![Footprint::rectangle(Point2::new(-5.0, 5.0), Point2::new(5.0, 15.0))];
//! let paths = vec![Path::new(vec![Point2::new(-20.0, 0.0), Point2::new(20.0, 0.0)])];
//!
//! let mut engine = FacadeVisibility::new(VisibilityConfig::default())?;
//! let mut visibility = EdgeVisibility::new();
//! engine.run(&mut buildings, Some(&paths), &mut visibility)?;
//! engine.cleanup();
//! # Ok::<(), facade_visibility::Error>(())
//! ```

pub mod accumulator;
pub mod active_set;
pub mod buffer;
pub mod building;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod path;
pub mod spatial;
pub mod sweep;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use accumulator::{BuildingId, Contribution, EdgeRef, EdgeVisibility, VisibilitySink};
pub use active_set::ActiveSet;
pub use buffer::VertexBuffer;
pub use building::{Building, Footprint};
pub use config::VisibilityConfig;
pub use engine::{FacadeVisibility, RunStats};
pub use error::{Error, Result};
pub use geometry::{LocalFrame, PathSegment, Polygon};
pub use path::{Path, PathNetwork};
pub use spatial::{build_index, IndexBackend, KdTree, RTreeIndex, SpatialIndex};
pub use sweep::{sweep_events, Event, SegmentSweep, SweepStats};
