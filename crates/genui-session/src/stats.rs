// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-session counters.

use genui_core::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters for one session: chunks read, events applied, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Chunks read from the source.
    pub chunks: u64,
    /// Bytes read from the source.
    pub bytes: u64,
    /// Events applied to the session state.
    pub events: u64,
    /// Applied events keyed by [`Event::kind_name`].
    pub counts: BTreeMap<String, u64>,
    /// Bytes of text carried by text deltas.
    pub delta_bytes: u64,
    /// Malformed events seen.
    pub malformed: u64,
}

impl SessionStats {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk read from the source.
    pub fn observe_chunk(&mut self, len: usize) {
        self.chunks += 1;
        self.bytes += len as u64;
    }

    /// Record one applied event.
    pub fn observe(&mut self, event: &Event) {
        *self.counts.entry(event.kind_name().to_string()).or_insert(0) += 1;
        self.events += 1;
        match event {
            Event::TextDelta { text } => self.delta_bytes += text.len() as u64,
            Event::Malformed { .. } => self.malformed += 1,
            _ => {}
        }
    }

    /// Count of events for a given kind name.
    pub fn count_for(&self, kind_name: &str) -> u64 {
        self.counts.get(kind_name).copied().unwrap_or(0)
    }
}
