// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sweep-line visibility for one path segment.
//!
//! Candidate footprints are moved into the segment's local frame, where x
//! runs along the segment and y points away from it. Every edge becomes a
//! start-event at its smaller x and an end-event at its larger x, both
//! carrying the edge's height (its largest distance from the path line).
//!
//! Edges lying entirely on the positive side go to the front list, all
//! others to the back list with heights taken by magnitude. Each list is
//! swept independently from left to right. At every x the lowest open edge
//! (nearest to the path) is the visible one; when it changes, the span it
//! was visible for is reported to the sink.

use std::cmp::Ordering;

use nalgebra::Point2;

use crate::accumulator::{BuildingId, EdgeRef, VisibilitySink};
use crate::active_set::ActiveSet;
use crate::buffer::VertexBuffer;
use crate::config::VisibilityConfig;
use crate::error::{Error, Result};
use crate::geometry::{LocalFrame, PathSegment};
use crate::spatial::SpatialIndex;

/// Start or end of one edge in segment-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub edge: EdgeRef,
    pub is_start: bool,
    pub x: f64,
    pub height: f64,
}

impl Event {
    pub fn start(edge: EdgeRef, x: f64, height: f64) -> Self {
        Self {
            edge,
            is_start: true,
            x,
            height,
        }
    }

    pub fn end(edge: EdgeRef, x: f64, height: f64) -> Self {
        Self {
            edge,
            is_start: false,
            x,
            height,
        }
    }
}

/// Sweep order: x, then height, then starts before ends, then edge.
///
/// Starts must precede ends at the same point, otherwise an edge without
/// extent along x would close before it opened.
fn event_order(a: &Event, b: &Event) -> Ordering {
    a.x.total_cmp(&b.x)
        .then_with(|| a.height.total_cmp(&b.height))
        .then_with(|| b.is_start.cmp(&a.is_start))
        .then_with(|| a.edge.cmp(&b.edge))
}

/// Counters for one processed segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Distinct buildings returned by the radius query.
    pub candidates: usize,
    /// Events generated across both lists.
    pub events: usize,
}

/// Reusable per-segment processor.
///
/// Event lists, the transformed-vertex scratch and the active set keep their
/// allocations from one segment to the next.
#[derive(Debug, Default)]
pub struct SegmentSweep {
    front: Vec<Event>,
    back: Vec<Event>,
    candidates: Vec<BuildingId>,
    local: Vec<Point2<f64>>,
    active: ActiveSet,
}

impl SegmentSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the footprints near `segment`, classifies their edges and
    /// sweeps both event lists, reporting visible spans to `sink`.
    pub fn process<S: VisibilitySink + ?Sized>(
        &mut self,
        segment: &PathSegment,
        buffer: &VertexBuffer,
        index: &dyn SpatialIndex,
        config: &VisibilityConfig,
        sink: &mut S,
    ) -> Result<SweepStats> {
        self.front.clear();
        self.back.clear();

        let radius = config.search_radius(segment.length);
        self.candidates.clear();
        self.candidates
            .extend(index.query_radius(segment.center, radius));
        self.candidates.sort_unstable();
        self.candidates.dedup();

        let frame = LocalFrame::new(segment);
        for &building in &self.candidates {
            let verts = buffer.vertices(building);
            let n = verts.len();
            if n < 2 {
                continue;
            }
            self.local.clear();
            self.local.extend(verts.iter().map(|p| frame.to_local(p)));

            for i in 0..n {
                let mut a = self.local[i];
                let mut b = self.local[(i + 1) % n];
                if a.x > b.x {
                    std::mem::swap(&mut a, &mut b);
                }
                classify_edge(
                    EdgeRef::new(building, i),
                    a,
                    b,
                    &mut self.front,
                    &mut self.back,
                );
            }
        }

        let stats = SweepStats {
            candidates: self.candidates.len(),
            events: self.front.len() + self.back.len(),
        };
        tracing::trace!(
            center_x = segment.center.x,
            center_y = segment.center.y,
            radius,
            candidates = stats.candidates,
            front = self.front.len(),
            back = self.back.len(),
            "Sweeping segment"
        );

        sweep_events(&mut self.front, &mut self.active, sink)?;
        sweep_events(&mut self.back, &mut self.active, sink)?;
        Ok(stats)
    }

    /// Drops scratch contents, keeping allocations.
    pub fn clear(&mut self) {
        self.front.clear();
        self.back.clear();
        self.candidates.clear();
        self.local.clear();
        self.active.clear();
    }
}

/// Pushes the start and end events of one edge; `a.x <= b.x`.
fn classify_edge(
    edge: EdgeRef,
    a: Point2<f64>,
    b: Point2<f64>,
    front: &mut Vec<Event>,
    back: &mut Vec<Event>,
) {
    if a.y > 0.0 && b.y > 0.0 {
        let height = a.y.max(b.y);
        front.push(Event::start(edge, a.x, height));
        front.push(Event::end(edge, b.x, height));
    } else {
        let height = a.y.abs().max(b.y.abs());
        back.push(Event::start(edge, a.x, height));
        back.push(Event::end(edge, b.x, height));
    }
}

/// Sweeps one event list left to right.
///
/// `events` is sorted in place. The active set is cleared before and after
/// the pass. An end-event for an edge that is neither visible nor occluded
/// fails with [`Error::ActiveSetMiss`]; one arriving while nothing is
/// visible fails with [`Error::OrphanEndEvent`].
pub fn sweep_events<S: VisibilitySink + ?Sized>(
    events: &mut [Event],
    occluded: &mut ActiveSet,
    sink: &mut S,
) -> Result<()> {
    events.sort_unstable_by(event_order);
    occluded.clear();

    // Visible edge and the x it became visible at.
    let mut visible: Option<(Event, f64)> = None;

    for &event in events.iter() {
        match visible {
            None => {
                if !event.is_start {
                    occluded.clear();
                    return Err(Error::OrphanEndEvent(event.edge));
                }
                visible = Some((event, event.x));
            }
            Some((current, since)) if event.is_start => {
                if event.height <= current.height {
                    report(sink, current.edge, event.x - since);
                    occluded.insert(current.height, current);
                    visible = Some((event, event.x));
                } else {
                    occluded.insert(event.height, event);
                }
            }
            Some((current, since)) => {
                if event.edge == current.edge {
                    report(sink, current.edge, event.x - since);
                    visible = occluded.pop_min().map(|next| (next, event.x));
                } else if let Err(err) = occluded.remove_equal(&event) {
                    occluded.clear();
                    return Err(err);
                }
            }
        }
    }

    occluded.clear();
    Ok(())
}

fn report<S: VisibilitySink + ?Sized>(sink: &mut S, edge: EdgeRef, span: f64) {
    if span > 0.0 {
        sink.add(edge.building, edge.edge, span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::Contribution;
    use approx::assert_relative_eq;

    fn edge(building: usize, i: usize) -> EdgeRef {
        EdgeRef::new(building, i)
    }

    fn span(edge: EdgeRef, x1: f64, x2: f64, height: f64) -> [Event; 2] {
        [Event::start(edge, x1, height), Event::end(edge, x2, height)]
    }

    fn run(events: &[[Event; 2]]) -> Result<Vec<Contribution>> {
        let mut list: Vec<Event> = events.iter().flatten().copied().collect();
        let mut set = ActiveSet::new();
        let mut found = Vec::new();
        sweep_events(&mut list, &mut set, &mut found)?;
        Ok(found)
    }

    fn lengths_of(found: &[Contribution], e: EdgeRef) -> Vec<f64> {
        found
            .iter()
            .filter(|c| c.edge == e)
            .map(|c| c.length)
            .collect()
    }

    #[test]
    fn test_single_edge_fully_visible() {
        let found = run(&[span(edge(0, 0), -5.0, 5.0, 5.0)]).unwrap();
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].length, 10.0);
    }

    #[test]
    fn test_partial_occlusion_splits_far_edge() {
        let far = edge(0, 0);
        let near = edge(1, 0);
        let found = run(&[
            span(far, -5.0, 5.0, 10.0),
            span(near, -2.0, 2.0, 3.0),
        ])
        .unwrap();

        let far_spans = lengths_of(&found, far);
        let near_spans = lengths_of(&found, near);
        assert_eq!(far_spans.len(), 2);
        assert_eq!(near_spans.len(), 1);
        assert_relative_eq!(far_spans[0], 3.0);
        assert_relative_eq!(far_spans[1], 3.0);
        assert_relative_eq!(near_spans[0], 4.0);
    }

    #[test]
    fn test_full_occlusion_gives_nothing() {
        let far = edge(0, 0);
        let near = edge(1, 0);
        let found = run(&[
            span(far, -5.0, 5.0, 8.0),
            span(near, -6.0, 6.0, 2.0),
        ])
        .unwrap();

        assert!(lengths_of(&found, far).is_empty());
        assert_relative_eq!(lengths_of(&found, near).iter().sum::<f64>(), 12.0);
    }

    #[test]
    fn test_hidden_edge_resurfaces_after_nearer_ends() {
        // Nearer edge starts first and ends in the middle of the farther one.
        let near = edge(0, 0);
        let far = edge(1, 0);
        let found = run(&[span(near, 0.0, 4.0, 1.0), span(far, 2.0, 10.0, 6.0)]).unwrap();

        assert_eq!(lengths_of(&found, near), vec![4.0]);
        assert_eq!(lengths_of(&found, far), vec![6.0]);
    }

    #[test]
    fn test_equal_height_newcomer_takes_over() {
        let first = edge(0, 0);
        let second = edge(0, 1);
        let found = run(&[span(first, 0.0, 10.0, 4.0), span(second, 3.0, 6.0, 4.0)]).unwrap();

        assert_eq!(lengths_of(&found, second), vec![3.0]);
        assert_eq!(lengths_of(&found, first), vec![3.0, 4.0]);
    }

    #[test]
    fn test_zero_width_edge_opens_and_closes() {
        let wall = edge(0, 0);
        let side = edge(0, 1);
        let found = run(&[span(wall, -5.0, 5.0, 5.0), span(side, 0.0, 0.0, 1.0)]).unwrap();

        assert!(lengths_of(&found, side).is_empty());
        assert_relative_eq!(lengths_of(&found, wall).iter().sum::<f64>(), 10.0);
    }

    #[test]
    fn test_contributions_bounded_by_extent() {
        let edges = [
            span(edge(0, 0), -8.0, 1.0, 7.0),
            span(edge(0, 1), -3.0, 9.0, 2.5),
            span(edge(1, 0), 0.5, 4.0, 1.0),
            span(edge(2, 3), -1.0, 12.0, 9.0),
        ];
        let found = run(&edges).unwrap();

        for [start, end] in &edges {
            let total: f64 = lengths_of(&found, start.edge).iter().sum();
            assert!(total <= end.x - start.x + 1e-9);
        }
        // The union of all spans is covered exactly once.
        let covered: f64 = found.iter().map(|c| c.length).sum();
        assert_relative_eq!(covered, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_orphan_end_event_is_a_fault() {
        let mut events = vec![Event::end(edge(0, 0), 1.0, 1.0)];
        let mut set = ActiveSet::new();
        let mut found: Vec<Contribution> = Vec::new();

        let err = sweep_events(&mut events, &mut set, &mut found).unwrap_err();
        assert!(matches!(err, Error::OrphanEndEvent(e) if e == edge(0, 0)));
    }

    #[test]
    fn test_unknown_end_event_is_a_fault() {
        let mut events = vec![
            Event::start(edge(0, 0), -5.0, 1.0),
            Event::start(edge(1, 0), -3.0, 5.0),
            // Closes an edge that never started while another is visible.
            Event::end(edge(7, 2), 0.0, 2.0),
            Event::end(edge(1, 0), 3.0, 5.0),
            Event::end(edge(0, 0), 5.0, 1.0),
        ];
        let mut set = ActiveSet::new();
        let mut found: Vec<Contribution> = Vec::new();

        let err = sweep_events(&mut events, &mut set, &mut found).unwrap_err();
        assert!(matches!(err, Error::ActiveSetMiss(e) if e == edge(7, 2)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_classify_sides() {
        let mut front = Vec::new();
        let mut back = Vec::new();
        let e = edge(0, 0);

        classify_edge(e, Point2::new(-1.0, 2.0), Point2::new(1.0, 3.0), &mut front, &mut back);
        assert_eq!(front.len(), 2);
        assert!(back.is_empty());
        assert_eq!(front[0], Event::start(e, -1.0, 3.0));
        assert_eq!(front[1], Event::end(e, 1.0, 3.0));

        front.clear();
        classify_edge(e, Point2::new(-1.0, -4.0), Point2::new(1.0, -2.0), &mut front, &mut back);
        assert!(front.is_empty());
        assert_eq!(back[0], Event::start(e, -1.0, 4.0));
        assert_eq!(back[1], Event::end(e, 1.0, 4.0));

        back.clear();
        classify_edge(e, Point2::new(0.0, -1.0), Point2::new(2.0, 3.0), &mut front, &mut back);
        assert!(front.is_empty());
        assert_eq!(back[0].height, 3.0);
    }

    #[test]
    fn test_event_order_puts_starts_first() {
        let mut events = vec![
            Event::end(edge(0, 1), 2.0, 3.0),
            Event::start(edge(0, 1), 2.0, 3.0),
            Event::start(edge(0, 0), 2.0, 1.0),
            Event::start(edge(0, 2), 1.0, 9.0),
        ];
        events.sort_unstable_by(event_order);

        assert_eq!(events[0].edge, edge(0, 2));
        assert_eq!(events[1].edge, edge(0, 0));
        assert!(events[2].is_start);
        assert!(!events[3].is_start);
    }
}
