// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session mode and lifecycle status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a session interprets its data frames. Fixed for the session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Frames carry escaped text deltas folded into one growing string.
    FreeText,
    /// Frames carry JSON documents that replace the dashboard state.
    Structured,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeText => f.write_str("free_text"),
            Self::Structured => f.write_str("structured"),
        }
    }
}

/// Lifecycle of one stream session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, not started.
    Idle,
    /// Pulling chunks from the transport.
    Active,
    /// Reached the terminator or natural end of stream.
    Completed,
    /// Stopped by an explicit cancel.
    Cancelled,
    /// Stopped by a transport error.
    Failed,
}

impl SessionStatus {
    /// Returns `true` if this status represents a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns the set of statuses that are valid successors of `self`.
    pub fn valid_transitions(&self) -> &'static [SessionStatus] {
        match self {
            Self::Idle => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::Completed, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Returns `true` if transitioning from `self` to `next` is valid.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
