// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classified stream events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::dashboard::FieldViolation;

/// The semantic meaning of one decoded frame.
///
/// Events are produced in strict arrival order; nothing is reordered or
/// deduplicated between the decoder and the reducers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Incremental text, already unescaped.
    TextDelta {
        /// Text to append.
        text: String,
    },
    /// The `[DONE]` sentinel.
    Terminator,
    /// A structured payload that passed the dashboard schema.
    StructuredPayload {
        /// The (envelope-stripped) data object.
        payload: Value,
    },
    /// A frame that could not be classified.
    Malformed {
        /// The raw payload as received.
        raw: String,
        /// Why classification failed.
        reason: MalformedReason,
    },
}

impl Event {
    /// Build a [`Event::TextDelta`].
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    /// snake_case name of the variant, e.g. `"text_delta"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text_delta",
            Self::Terminator => "terminator",
            Self::StructuredPayload { .. } => "structured_payload",
            Self::Malformed { .. } => "malformed",
        }
    }

    /// Returns `true` for [`Event::Terminator`].
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Terminator)
    }
}

/// Why a frame was classified as [`Event::Malformed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MalformedReason {
    /// The data line is not valid UTF-8.
    InvalidUtf8 {
        /// Decoder detail.
        detail: String,
    },
    /// The data line exceeds the configured maximum length.
    LineTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The payload is not valid JSON.
    InvalidJson {
        /// Parser detail.
        detail: String,
    },
    /// An envelope with a `type` other than `ui_update`.
    UnexpectedEnvelope {
        /// The envelope type that was received.
        kind: String,
        /// Message carried by the envelope, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The payload parsed but failed the dashboard schema.
    Schema {
        /// Every violated rule.
        violations: Vec<FieldViolation>,
    },
}

impl MalformedReason {
    /// Returns the schema violations when this is a schema failure.
    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            Self::Schema { violations } => Some(violations),
            _ => None,
        }
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 { detail } => write!(f, "invalid UTF-8: {detail}"),
            Self::LineTooLong { len, max } => {
                write!(f, "line length {len} exceeds maximum {max}")
            }
            Self::InvalidJson { detail } => write!(f, "invalid JSON: {detail}"),
            Self::UnexpectedEnvelope { kind, message } => {
                write!(f, "unexpected envelope type '{kind}'")?;
                if let Some(m) = message {
                    write!(f, ": {m}")?;
                }
                Ok(())
            }
            Self::Schema { violations } => {
                let parts: Vec<String> = violations.iter().map(ToString::to_string).collect();
                write!(f, "schema violation: {}", parts.join("; "))
            }
        }
    }
}
