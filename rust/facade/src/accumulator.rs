// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge visibility accumulators.
//!
//! The sweep never touches buildings directly. Every visible span it finds is
//! reported to a [`VisibilitySink`] keyed by building and edge index, so the
//! caller decides where lengths end up: the stock [`EdgeVisibility`] table, a
//! recording `Vec<Contribution>`, or its own building records.

use std::fmt;

use rustc_hash::FxHashMap;

/// Index of a building in the slice handed to a run.
pub type BuildingId = usize;

/// Identity of one footprint edge: edge `i` joins vertex `i` and `i + 1 mod n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeRef {
    pub building: BuildingId,
    pub edge: usize,
}

impl EdgeRef {
    pub fn new(building: BuildingId, edge: usize) -> Self {
        Self { building, edge }
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "building {} edge {}", self.building, self.edge)
    }
}

/// Receives visible-length contributions.
pub trait VisibilitySink {
    /// Called once per run for every building with a usable footprint,
    /// before any contribution for it is reported.
    fn init_building(&mut self, _building: BuildingId, _edge_count: usize) {}

    /// Adds `length` to the accumulated visibility of one edge.
    fn add(&mut self, building: BuildingId, edge: usize, length: f64);
}

/// A single reported span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub edge: EdgeRef,
    pub length: f64,
}

impl VisibilitySink for Vec<Contribution> {
    fn add(&mut self, building: BuildingId, edge: usize, length: f64) {
        self.push(Contribution {
            edge: EdgeRef::new(building, edge),
            length,
        });
    }
}

impl<S: VisibilitySink + ?Sized> VisibilitySink for &mut S {
    fn init_building(&mut self, building: BuildingId, edge_count: usize) {
        (**self).init_building(building, edge_count)
    }

    fn add(&mut self, building: BuildingId, edge: usize, length: f64) {
        (**self).add(building, edge, length)
    }
}

/// Per-building table of accumulated edge lengths.
///
/// Accumulation is monotonic: lengths are only ever added. A building's
/// table is created on first `init_building` and survives later runs until
/// [`EdgeVisibility::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct EdgeVisibility {
    edges: FxHashMap<BuildingId, Vec<f64>>,
}

impl EdgeVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated length of one edge (zero if never seen).
    pub fn get(&self, building: BuildingId, edge: usize) -> f64 {
        self.edges
            .get(&building)
            .and_then(|lengths| lengths.get(edge))
            .copied()
            .unwrap_or(0.0)
    }

    /// All accumulated lengths of a building, indexed by edge.
    pub fn edges(&self, building: BuildingId) -> Option<&[f64]> {
        self.edges.get(&building).map(|v| v.as_slice())
    }

    /// Sum over every edge of every building.
    pub fn total(&self) -> f64 {
        self.edges.values().flatten().sum()
    }

    /// Number of buildings holding an accumulator.
    pub fn building_count(&self) -> usize {
        self.edges.len()
    }

    /// Drops every accumulator.
    pub fn reset(&mut self) {
        self.edges.clear();
    }
}

impl VisibilitySink for EdgeVisibility {
    fn init_building(&mut self, building: BuildingId, edge_count: usize) {
        let lengths = self.edges.entry(building).or_default();
        if lengths.len() < edge_count {
            lengths.resize(edge_count, 0.0);
        }
    }

    fn add(&mut self, building: BuildingId, edge: usize, length: f64) {
        let lengths = self.edges.entry(building).or_default();
        if lengths.len() <= edge {
            lengths.resize(edge + 1, 0.0);
        }
        lengths[edge] += length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_zeroed_edges() {
        let mut vis = EdgeVisibility::new();
        vis.init_building(3, 4);

        assert_eq!(vis.edges(3), Some(&[0.0, 0.0, 0.0, 0.0][..]));
        assert_eq!(vis.edges(0), None);
    }

    #[test]
    fn init_keeps_existing_lengths() {
        let mut vis = EdgeVisibility::new();
        vis.init_building(0, 2);
        vis.add(0, 1, 2.5);
        vis.init_building(0, 2);

        assert_eq!(vis.get(0, 1), 2.5);
    }

    #[test]
    fn add_accumulates() {
        let mut vis = EdgeVisibility::new();
        vis.add(1, 0, 1.0);
        vis.add(1, 0, 2.0);
        vis.add(1, 2, 0.5);

        assert_eq!(vis.get(1, 0), 3.0);
        assert_eq!(vis.get(1, 1), 0.0);
        assert_eq!(vis.get(1, 2), 0.5);
        assert_eq!(vis.total(), 3.5);

        vis.reset();
        assert_eq!(vis.building_count(), 0);
    }

    #[test]
    fn recording_sink_keeps_every_call() {
        let mut calls: Vec<Contribution> = Vec::new();
        calls.add(2, 1, 1.5);
        calls.add(2, 1, 0.5);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].edge, EdgeRef::new(2, 1));
        assert_eq!(calls[1].length, 0.5);
    }

    #[test]
    fn edge_ref_display() {
        assert_eq!(EdgeRef::new(4, 7).to_string(), "building 4 edge 7");
    }
}
