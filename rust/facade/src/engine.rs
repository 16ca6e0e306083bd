// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run orchestration.
//!
//! A run has three phases:
//! 1. Prepare footprints (lazy polygon init) and accumulators
//! 2. Build the vertex buffer and the point index over it
//! 3. Sweep every segment of every path, feeding the sink
//!
//! In parallel mode phase 3 computes each segment's spans on the rayon pool
//! and replays them into the sink in segment order, so the sink sees the
//! same calls as in a sequential run.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::accumulator::{BuildingId, Contribution, VisibilitySink};
use crate::building::Building;
use crate::buffer::VertexBuffer;
use crate::config::VisibilityConfig;
use crate::error::Result;
use crate::geometry::PathSegment;
use crate::path::PathNetwork;
use crate::spatial::{build_index, SpatialIndex};
use crate::sweep::{SegmentSweep, SweepStats};

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Buildings handed to the run.
    pub buildings: usize,
    /// Buildings left out for lack of a usable footprint.
    pub skipped_buildings: usize,
    /// Footprint vertices indexed.
    pub vertices: usize,
    /// Path segments swept.
    pub segments: usize,
    /// Events generated over all segments.
    pub events: usize,
    /// Non-empty spans reported to the sink.
    pub contributions: usize,
}

impl RunStats {
    fn record(&mut self, sweep: SweepStats) {
        self.segments += 1;
        self.events += sweep.events;
    }
}

/// Computes facade visibility for a set of buildings along a path network.
pub struct FacadeVisibility {
    config: VisibilityConfig,
    buffer: Option<VertexBuffer>,
    index: Option<Box<dyn SpatialIndex>>,
    sweep: SegmentSweep,
}

impl FacadeVisibility {
    pub fn new(config: VisibilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            buffer: None,
            index: None,
            sweep: SegmentSweep::new(),
        })
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Vertex buffer of the last run, until [`Self::cleanup`].
    pub fn buffer(&self) -> Option<&VertexBuffer> {
        self.buffer.as_ref()
    }

    /// Point index of the last run, until [`Self::cleanup`].
    pub fn index(&self) -> Option<&dyn SpatialIndex> {
        self.index.as_deref()
    }

    /// Adds the visible length of every footprint edge, as seen from every
    /// segment of `paths`, to `sink`.
    ///
    /// `None` for `paths` means there is no path network to look from and the
    /// run does nothing. Building ids handed to the sink are indices into
    /// `buildings`. Buffer and index are rebuilt from scratch on every call.
    pub fn run<B, P, S>(
        &mut self,
        buildings: &mut [B],
        paths: Option<&P>,
        sink: &mut S,
    ) -> Result<RunStats>
    where
        B: Building,
        P: PathNetwork + ?Sized,
        S: VisibilitySink + ?Sized,
    {
        let Some(paths) = paths else {
            tracing::debug!("No path network, skipping facade visibility");
            return Ok(RunStats::default());
        };
        let started = Instant::now();
        self.cleanup();

        let mut stats = RunStats {
            buildings: buildings.len(),
            ..RunStats::default()
        };
        for (id, building) in buildings.iter_mut().enumerate() {
            if building.polygon().is_none() {
                building.init_polygon();
            }
            match building.polygon() {
                Some(polygon) => sink.init_building(id, polygon.n()),
                None => stats.skipped_buildings += 1,
            }
        }

        let buffer: &VertexBuffer = self.buffer.insert(VertexBuffer::from_buildings(buildings));
        let index: &dyn SpatialIndex = &**self.index.insert(build_index(
            self.config.backend,
            buffer.points(),
            buffer.owners(),
        )?);
        stats.vertices = buffer.len();
        tracing::debug!(
            buildings = buffer.building_count(),
            skipped = stats.skipped_buildings,
            vertices = buffer.len(),
            backend = ?self.config.backend,
            "Built footprint index"
        );

        let mut counted = Counted::new(sink);
        if self.config.parallel {
            let segments: Vec<PathSegment> = paths.segments().collect();
            let config = &self.config;
            let batches: Vec<(Vec<Contribution>, SweepStats)> = segments
                .par_iter()
                .map_init(SegmentSweep::new, |sweep, segment| -> Result<_> {
                    let mut found = Vec::new();
                    let s = sweep.process(segment, buffer, index, config, &mut found)?;
                    Ok((found, s))
                })
                .collect::<Result<_>>()?;

            for (found, s) in batches {
                for c in found {
                    counted.add(c.edge.building, c.edge.edge, c.length);
                }
                stats.record(s);
            }
        } else {
            for segment in paths.segments() {
                let s = self
                    .sweep
                    .process(&segment, buffer, index, &self.config, &mut counted)?;
                stats.record(s);
            }
        }
        stats.contributions = counted.count;

        tracing::info!(
            buildings = stats.buildings,
            skipped = stats.skipped_buildings,
            segments = stats.segments,
            events = stats.events,
            contributions = stats.contributions,
            parallel = self.config.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Facade visibility complete"
        );
        Ok(stats)
    }

    /// Releases the vertex buffer, index and sweep scratch. Safe to call any
    /// number of times.
    pub fn cleanup(&mut self) {
        self.buffer = None;
        self.index = None;
        self.sweep = SegmentSweep::new();
    }
}

impl std::fmt::Debug for FacadeVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacadeVisibility")
            .field("config", &self.config)
            .field("vertices", &self.buffer.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Sink adapter counting forwarded spans.
struct Counted<'a, S: ?Sized> {
    inner: &'a mut S,
    count: usize,
}

impl<'a, S: VisibilitySink + ?Sized> Counted<'a, S> {
    fn new(inner: &'a mut S) -> Self {
        Self { inner, count: 0 }
    }
}

impl<S: VisibilitySink + ?Sized> VisibilitySink for Counted<'_, S> {
    fn init_building(&mut self, building: BuildingId, edge_count: usize) {
        self.inner.init_building(building, edge_count);
    }

    fn add(&mut self, building: BuildingId, edge: usize, length: f64) {
        self.count += 1;
        self.inner.add(building, edge, length);
    }
}
