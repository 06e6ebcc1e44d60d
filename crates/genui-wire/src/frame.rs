// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data-line recognition.

use genui_core::MalformedReason;
use tracing::{trace, warn};

use crate::buffer::Line;

/// Marker and separator that introduce a data line.
pub const DATA_PREFIX: &[u8] = b"data: ";

/// Default maximum line length (16 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// How much of an oversized line is kept in [`Frame::Undecodable::raw`].
pub(crate) const RAW_PREVIEW_BYTES: usize = 256;

/// One decoded data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A `data: ` line. The payload is everything after the prefix, untrimmed.
    Data {
        /// Payload text.
        payload: String,
    },
    /// A `data: ` line that could not be turned into text.
    Undecodable {
        /// Lossy rendering of the payload.
        raw: String,
        /// Why it could not be decoded.
        reason: MalformedReason,
    },
}

/// Turns complete lines into [`Frame`]s.
///
/// Blank lines, comments, `event:`/`id:`/`retry:` fields and `data:` without
/// the trailing space are not data lines and produce no frame.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_line_bytes: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with the default line limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }

    /// Create a decoder with a custom line limit.
    #[must_use]
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }

    /// Configured line limit in bytes.
    #[must_use]
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Decode a line produced by a [`LineBuffer`](crate::LineBuffer).
    pub fn decode_line(&self, line: &Line) -> Option<Frame> {
        match line {
            Line::Complete(bytes) => self.decode(bytes),
            Line::Oversized { head, len } => {
                let payload = head.strip_prefix(DATA_PREFIX)?;
                Some(self.too_long(payload, *len))
            }
        }
    }

    /// Decode one complete line (without its terminator).
    pub fn decode(&self, line: &[u8]) -> Option<Frame> {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            trace!(target: "genui.wire", len = line.len(), "ignoring non-data line");
            return None;
        };

        if line.len() > self.max_line_bytes {
            return Some(self.too_long(payload, line.len()));
        }

        match std::str::from_utf8(payload) {
            Ok(text) => Some(Frame::Data {
                payload: text.to_string(),
            }),
            Err(e) => {
                warn!(target: "genui.wire", error = %e, "data line is not valid UTF-8");
                Some(Frame::Undecodable {
                    raw: String::from_utf8_lossy(payload).into_owned(),
                    reason: MalformedReason::InvalidUtf8 {
                        detail: e.to_string(),
                    },
                })
            }
        }
    }

    fn too_long(&self, payload: &[u8], len: usize) -> Frame {
        warn!(
            target: "genui.wire",
            len,
            max = self.max_line_bytes,
            "data line exceeds maximum length"
        );
        let preview = &payload[..payload.len().min(RAW_PREVIEW_BYTES)];
        Frame::Undecodable {
            raw: String::from_utf8_lossy(preview).into_owned(),
            reason: MalformedReason::LineTooLong {
                len,
                max: self.max_line_bytes,
            },
        }
    }
}
