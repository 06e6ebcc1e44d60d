// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stream sessions: pull chunks from a [`ByteSource`], decode them, and fold
//! the events into an observable [`SessionSnapshot`].
//!
//! A [`StreamSession`] moves through `Idle → Active → {Completed | Cancelled
//! | Failed}`. Observers hold a [`SessionHandle`], which exposes the snapshot
//! through a `tokio::sync::watch` channel and can cancel the session at any
//! time. Once cancelled, nothing more is applied, even for bytes that were
//! already read.
//!
//! [`SessionController`] owns the single live session of one caller and
//! retires it before starting the next.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod controller;
pub mod session;
pub mod source;
pub mod stats;

pub use cancel::CancelToken;
pub use controller::SessionController;
pub use session::{SessionHandle, SessionSnapshot, SessionView, StreamSession};
pub use source::{ByteSource, ChannelSource, ScriptedSource};
pub use stats::SessionStats;
