// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame classification.

use genui_core::{
    DONE_SENTINEL, Event, MalformedReason, SessionMode, unwrap_envelope, validate_dashboard,
};
use serde_json::Value;
use tracing::debug;

use crate::frame::Frame;

/// Replace every literal backslash-n pair with a line break.
pub fn unescape(payload: &str) -> String {
    payload.replace("\\n", "\n")
}

/// Assigns meaning to frames for one fixed [`SessionMode`].
///
/// Classification is total: every frame becomes exactly one [`Event`].
#[derive(Debug, Clone, Copy)]
pub struct EventClassifier {
    mode: SessionMode,
}

impl EventClassifier {
    /// Create a classifier for `mode`.
    #[must_use]
    pub fn new(mode: SessionMode) -> Self {
        Self { mode }
    }

    /// The mode this classifier was built for.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Classify one frame.
    pub fn classify(&self, frame: &Frame) -> Event {
        let payload = match frame {
            Frame::Data { payload } => payload,
            Frame::Undecodable { raw, reason } => {
                return Event::Malformed {
                    raw: raw.clone(),
                    reason: reason.clone(),
                };
            }
        };

        if payload == DONE_SENTINEL {
            return Event::Terminator;
        }

        match self.mode {
            SessionMode::FreeText => Event::TextDelta {
                text: unescape(payload),
            },
            SessionMode::Structured => classify_structured(payload),
        }
    }
}

fn classify_structured(payload: &str) -> Event {
    let malformed = |reason: MalformedReason| {
        debug!(target: "genui.wire", %reason, "structured frame rejected");
        Event::Malformed {
            raw: payload.to_string(),
            reason,
        }
    };

    let doc: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            return malformed(MalformedReason::InvalidJson {
                detail: e.to_string(),
            });
        }
    };

    let data = match unwrap_envelope(&doc) {
        Ok(data) => data,
        Err(reason) => return malformed(reason),
    };

    match validate_dashboard(data) {
        Ok(_) => Event::StructuredPayload {
            payload: data.clone(),
        },
        Err(violations) => malformed(MalformedReason::Schema { violations }),
    }
}
