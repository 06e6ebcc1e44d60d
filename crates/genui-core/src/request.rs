// SPDX-License-Identifier: MIT OR Apache-2.0
//! Request and response bodies shared by the backend endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of every request: one text message in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

impl ChatRequest {
    /// Build a request for `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the non-streaming basic exchange: one text response out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BasicResponse {
    /// The complete response text.
    pub response: String,
}
