// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line reassembly across chunk boundaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::frame::{DATA_PREFIX, DEFAULT_MAX_LINE_BYTES, RAW_PREVIEW_BYTES};

/// Bytes of an oversized line kept for its frame.
const OVERSIZED_HEAD_BYTES: usize = DATA_PREFIX.len() + RAW_PREVIEW_BYTES;

/// What to do with an unterminated line left over when the stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrailingLinePolicy {
    /// Treat the remainder as one final implicit line.
    #[default]
    Flush,
    /// Drop the remainder.
    Discard,
}

impl fmt::Display for TrailingLinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flush => f.write_str("flush"),
            Self::Discard => f.write_str("discard"),
        }
    }
}

/// Returned when a string names neither `flush` nor `discard`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown trailing line policy '{}' (expected flush or discard)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for TrailingLinePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flush" => Ok(Self::Flush),
            "discard" => Ok(Self::Discard),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// One line produced by a [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A complete line without its terminator.
    Complete(Vec<u8>),
    /// A line that outgrew the buffer's limit before its newline arrived.
    ///
    /// Only the first bytes are kept; `len` is the length of the whole line.
    Oversized {
        /// Leading bytes of the line.
        head: Vec<u8>,
        /// Length of the whole line without its terminator.
        len: usize,
    },
}

impl Line {
    /// Length of the whole line.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Complete(bytes) => bytes.len(),
            Self::Oversized { len, .. } => *len,
        }
    }

    /// Returns `true` for an empty line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Progress through a line that is being skipped.
#[derive(Debug, Clone, Copy)]
struct Skipping {
    seen: usize,
    last: u8,
}

/// Accumulates raw chunks and yields complete lines.
///
/// After every call the internal buffer holds at most one partial line.
/// Returned lines exclude the `\n` and a single trailing `\r`, so CRLF and
/// LF streams decode identically.
///
/// A partial line is never kept beyond the line limit: once it outgrows the
/// limit, only its head is retained and the rest of the line is counted and
/// dropped until the next newline, which yields a [`Line::Oversized`].
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buf: Vec<u8>,
    /// Bytes of `buf` already known to contain no newline.
    scanned: usize,
    policy: TrailingLinePolicy,
    max_line_bytes: usize,
    skipping: Option<Skipping>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            policy: TrailingLinePolicy::default(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            skipping: None,
        }
    }
}

impl LineBuffer {
    /// Create an empty buffer that flushes its trailing line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with the given trailing-line policy.
    #[must_use]
    pub fn with_policy(policy: TrailingLinePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Bound partial lines to `max_line_bytes`.
    #[must_use]
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// The trailing-line policy in effect.
    #[must_use]
    pub fn policy(&self) -> TrailingLinePolicy {
        self.policy
    }

    /// Configured line limit in bytes.
    #[must_use]
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Append `chunk` and return every line it completed, in order.
    ///
    /// A chunk without a newline returns nothing and is kept for later.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        if let Some(skip) = self.skipping.as_mut() {
            match rest.iter().position(|&b| b == b'\n') {
                None => {
                    skip.seen = skip.seen.saturating_add(rest.len());
                    if let Some(&b) = rest.last() {
                        skip.last = b;
                    }
                    return lines;
                }
                Some(i) => {
                    skip.seen = skip.seen.saturating_add(i);
                    if i > 0 {
                        skip.last = rest[i - 1];
                    }
                    lines.extend(self.take_oversized());
                    rest = &rest[i + 1..];
                }
            }
        }

        self.buf.extend_from_slice(rest);
        self.drain_lines(&mut lines);
        self.bound_pending();
        lines
    }

    /// End of stream: apply the trailing-line policy to whatever is left.
    ///
    /// The buffer is empty afterwards.
    pub fn finish(&mut self) -> Option<Line> {
        let line = if self.skipping.is_some() {
            self.take_oversized()?
        } else if self.buf.is_empty() {
            return None;
        } else {
            let mut rest = std::mem::take(&mut self.buf);
            self.scanned = 0;
            strip_cr(&mut rest);
            Line::Complete(rest)
        };

        match self.policy {
            TrailingLinePolicy::Flush => Some(line),
            TrailingLinePolicy::Discard => {
                debug!(
                    target: "genui.wire",
                    bytes = line.len(),
                    "discarding unterminated trailing line"
                );
                None
            }
        }
    }

    /// Return `true` if no bytes are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty() && self.skipping.is_none()
    }

    /// Number of pending bytes held in memory.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Discard pending bytes.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.skipping = None;
    }

    fn drain_lines(&mut self, lines: &mut Vec<Line>) {
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buf[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            let mut line = self.buf[start..end].to_vec();
            strip_cr(&mut line);
            lines.push(Line::Complete(line));
            start = end + 1;
            from = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();
    }

    /// Switch to skipping once the partial line cannot fit the limit, even
    /// after a trailing `\r` is stripped.
    fn bound_pending(&mut self) {
        if self.buf.len() <= self.max_line_bytes.saturating_add(1) {
            return;
        }
        let last = self.buf.last().copied().unwrap_or_default();
        warn!(
            target: "genui.wire",
            pending = self.buf.len(),
            max = self.max_line_bytes,
            "partial line exceeds maximum length; skipping to next newline"
        );
        self.skipping = Some(Skipping {
            seen: self.buf.len(),
            last,
        });
        self.buf.truncate(OVERSIZED_HEAD_BYTES);
        self.buf.shrink_to_fit();
        self.scanned = self.buf.len();
    }

    fn take_oversized(&mut self) -> Option<Line> {
        let skip = self.skipping.take()?;
        let head = std::mem::take(&mut self.buf);
        self.scanned = 0;
        let len = if skip.last == b'\r' {
            skip.seen - 1
        } else {
            skip.seen
        };
        Some(Line::Oversized { head, len })
    }
}

fn strip_cr(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}
