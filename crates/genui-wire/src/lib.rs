// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental decoder for the `data: <payload>` line protocol.
//!
//! Bytes arrive in arbitrary chunks. They pass through three stages, each
//! usable on its own:
//!
//! 1. [`LineBuffer`] reassembles complete lines across chunk boundaries.
//! 2. [`FrameDecoder`] keeps only `data: ` lines and turns them into [`Frame`]s.
//! 3. [`EventClassifier`] gives each frame its meaning for the session mode.
//!
//! [`WireDecoder`] wires the three together.
//!
//! # Examples
//!
//! ```
//! use genui_core::{Event, SessionMode};
//! use genui_wire::{DecodeOptions, WireDecoder};
//!
//! let mut decoder = WireDecoder::new(SessionMode::FreeText, DecodeOptions::default());
//! assert!(decoder.push(b"data: Hel").is_empty());
//! assert!(decoder.push(b"lo wor").is_empty());
//! let events = decoder.push(b"ld\ndata: [DONE]\n");
//! assert_eq!(events, vec![Event::text("Hello world"), Event::Terminator]);
//! ```
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod classify;
pub mod decoder;
pub mod frame;

pub use buffer::{Line, LineBuffer, TrailingLinePolicy, UnknownPolicy};
pub use classify::{EventClassifier, unescape};
pub use decoder::{DecodeOptions, WireDecoder};
pub use frame::{DATA_PREFIX, DEFAULT_MAX_LINE_BYTES, Frame, FrameDecoder};
