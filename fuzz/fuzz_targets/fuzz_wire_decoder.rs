// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the wire decoder with arbitrary bodies and chunkings.
//!
//! 1. Decoding never panics, whatever the bytes.
//! 2. The events do not depend on where the body was cut.
//! 3. Reducing the events never leaves an invalid dashboard visible.
#![no_main]
use arbitrary::Arbitrary;
use genui_core::{DashboardState, SessionMode, validate_dashboard};
use genui_reduce::reduce_dashboard;
use genui_wire::{DecodeOptions, WireDecoder};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    structured: bool,
    cuts: Vec<u16>,
    body: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mode = if input.structured {
        SessionMode::Structured
    } else {
        SessionMode::FreeText
    };
    let options = DecodeOptions {
        max_line_bytes: 256,
        ..DecodeOptions::default()
    };

    let whole = WireDecoder::new(mode, options).decode_all([input.body.as_slice()]);

    let mut points: Vec<usize> = input
        .cuts
        .iter()
        .map(|&c| usize::from(c) % (input.body.len() + 1))
        .collect();
    points.sort_unstable();
    points.dedup();
    let mut chunks = Vec::new();
    let mut start = 0;
    for p in points {
        chunks.push(&input.body[start..p]);
        start = p;
    }
    chunks.push(&input.body[start..]);
    let pieces = WireDecoder::new(mode, options).decode_all(chunks);
    assert_eq!(whole, pieces);

    if mode == SessionMode::Structured {
        let mut state = DashboardState::default();
        for event in &whole {
            state = reduce_dashboard(state, event).state;
            let doc = serde_json::to_value(&state).unwrap();
            assert_eq!(validate_dashboard(&doc).as_ref(), Ok(&state));
        }
    }
});
