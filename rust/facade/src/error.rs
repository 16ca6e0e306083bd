// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for facade visibility computation.

use crate::accumulator::EdgeRef;

/// Result type alias for facade visibility operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing facade visibility.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A building outline cannot form a usable footprint.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    /// A path segment has no direction or no length.
    #[error("invalid path segment: {0}")]
    InvalidPath(String),

    /// Search margins are negative or not finite.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inputs handed to an index or buffer do not line up.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An end-event closed an edge that is neither active nor occluded.
    ///
    /// Signals corrupted event ordering or a degenerate footprint that
    /// slipped past polygon validation.
    #[error("active set has no occluded entry for {0}")]
    ActiveSetMiss(EdgeRef),

    /// An end-event arrived while no edge was active.
    #[error("end event for {0} arrived with no active edge")]
    OrphanEndEvent(EdgeRef),
}

impl Error {
    /// Returns true for faults raised by the sweep's own bookkeeping.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(self, Error::ActiveSetMiss(_) | Error::OrphanEndEvent(_))
    }
}
