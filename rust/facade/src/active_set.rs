// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered active set for the visibility sweep.
//!
//! Holds start-events that are currently occluded, keyed by their height
//! above the path. The sweep needs three things from it: insert, remove a
//! specific edge when its end-event arrives, and pop the lowest (nearest)
//! edge when the visible one ends.
//!
//! Entries live in a `BTreeMap` keyed by `(height, insertion sequence)`, so
//! equal heights stay distinct and pop in insertion order. A side index
//! from edge identity to its keys makes removal O(log n).

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::accumulator::EdgeRef;
use crate::error::{Error, Result};
use crate::sweep::Event;

type Slot = (OrderedFloat<f64>, u64);

/// Sorted multiset of occluded events.
#[derive(Debug, Default)]
pub struct ActiveSet {
    entries: BTreeMap<Slot, Event>,
    slots: FxHashMap<EdgeRef, SmallVec<[Slot; 1]>>,
    seq: u64,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `event` under `key`.
    pub fn insert(&mut self, key: f64, event: Event) {
        let slot = (OrderedFloat(key), self.seq);
        self.seq += 1;
        self.entries.insert(slot, event);
        self.slots.entry(event.edge).or_default().push(slot);
    }

    /// Removes the entry for the same edge as `event`.
    ///
    /// A miss means the sweep lost track of an edge and is reported as
    /// [`Error::ActiveSetMiss`].
    pub fn remove_equal(&mut self, event: &Event) -> Result<Event> {
        let slots = self
            .slots
            .get_mut(&event.edge)
            .ok_or(Error::ActiveSetMiss(event.edge))?;
        let slot = slots.remove(0);
        if slots.is_empty() {
            self.slots.remove(&event.edge);
        }
        self.entries
            .remove(&slot)
            .ok_or(Error::ActiveSetMiss(event.edge))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_min(&mut self) -> Option<Event> {
        let (slot, event) = self.entries.pop_first()?;
        if let Some(slots) = self.slots.get_mut(&event.edge) {
            slots.retain(|s| *s != slot);
            if slots.is_empty() {
                self.slots.remove(&event.edge);
            }
        }
        Some(event)
    }

    /// Smallest key currently held.
    pub fn min_key(&self) -> Option<f64> {
        self.entries.keys().next().map(|(key, _)| key.into_inner())
    }

    pub fn contains(&self, edge: &EdgeRef) -> bool {
        self.slots.contains_key(edge)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
        self.seq = 0;
    }
}
