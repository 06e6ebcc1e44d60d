// SPDX-License-Identifier: MIT OR Apache-2.0
//! The three wire stages combined.

use genui_core::{Event, SessionMode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::{Line, LineBuffer, TrailingLinePolicy};
use crate::classify::EventClassifier;
use crate::frame::{DEFAULT_MAX_LINE_BYTES, FrameDecoder};

/// Tunables for a [`WireDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Longest accepted data line in bytes.
    pub max_line_bytes: usize,
    /// Handling of an unterminated line at end of stream.
    pub trailing_line: TrailingLinePolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            trailing_line: TrailingLinePolicy::default(),
        }
    }
}

/// Bytes in, events out.
#[derive(Debug, Clone)]
pub struct WireDecoder {
    lines: LineBuffer,
    frames: FrameDecoder,
    classifier: EventClassifier,
}

impl WireDecoder {
    /// Create a decoder for `mode`.
    #[must_use]
    pub fn new(mode: SessionMode, options: DecodeOptions) -> Self {
        Self {
            lines: LineBuffer::with_policy(options.trailing_line)
                .with_max_line_bytes(options.max_line_bytes),
            frames: FrameDecoder::with_max_line_bytes(options.max_line_bytes),
            classifier: EventClassifier::new(mode),
        }
    }

    /// The session mode events are classified for.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.classifier.mode()
    }

    /// Feed one chunk; returns the events of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Event> {
        let lines = self.lines.push(chunk);
        let events: Vec<Event> = lines.iter().filter_map(|l| self.line_event(l)).collect();
        debug!(
            target: "genui.wire",
            chunk_len = chunk.len(),
            lines = lines.len(),
            events = events.len(),
            pending = self.lines.buffered_len(),
            "decoded chunk"
        );
        events
    }

    /// End of stream; applies the trailing-line policy.
    pub fn finish(&mut self) -> Vec<Event> {
        self.lines
            .finish()
            .and_then(|line| self.line_event(&line))
            .into_iter()
            .collect()
    }

    /// Number of pending bytes held in memory; bounded by the line limit.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.lines.buffered_len()
    }

    /// Drop any pending partial line.
    pub fn reset(&mut self) {
        self.lines.reset();
    }

    /// Decode a complete body delivered as `chunks`, including the trailing line.
    pub fn decode_all<'a, I>(mut self, chunks: I) -> Vec<Event>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(self.push(chunk));
        }
        events.extend(self.finish());
        events
    }

    fn line_event(&self, line: &Line) -> Option<Event> {
        self.frames
            .decode_line(line)
            .map(|frame| self.classifier.classify(&frame))
    }
}
