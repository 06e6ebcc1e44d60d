// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contract types shared by every genui crate.
//!
//! - [`Event`] / [`MalformedReason`]: the classified meaning of one wire frame.
//! - [`DashboardState`] / [`Theme`]: the structured, schema-validated state that
//!   structured sessions replace wholesale.
//! - [`SessionMode`] / [`SessionStatus`]: per-session mode and lifecycle.
//! - [`ChatRequest`] / [`BasicResponse`]: request and response bodies shared by
//!   every backend endpoint.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dashboard;
pub mod event;
pub mod request;
pub mod session;

pub use dashboard::{
    DashboardState, FieldViolation, Theme, UI_UPDATE, UiEnvelope, UnknownTheme, unwrap_envelope,
    validate_dashboard,
};
pub use event::{Event, MalformedReason};
pub use request::{BasicResponse, ChatRequest};
pub use session::{SessionMode, SessionStatus};

/// Sentinel payload that terminates a stream.
pub const DONE_SENTINEL: &str = "[DONE]";
