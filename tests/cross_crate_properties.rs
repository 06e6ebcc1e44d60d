// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cross-crate property-based tests: a whole session must not care how the
//! transport chose to cut the byte stream.

use genui_core::{DashboardState, SessionMode, Theme};
use genui_reduce::{reduce_dashboard, reduce_text};
use genui_session::{ScriptedSource, SessionSnapshot, StreamSession};
use genui_wire::{DecodeOptions, TrailingLinePolicy, WireDecoder};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_text_payload() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ,.!?]{0,12}",
        Just("\\n".to_string()),
        Just("héllo wörld ✓".to_string()),
        Just("{\"not\": \"a dashboard\"}".to_string()),
    ]
}

fn arb_theme() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("light"),
        Just("dark"),
        Just("blue"),
        Just("red"),
        Just("purple"),
    ]
}

fn arb_structured_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_theme(), "[a-zA-Z ]{0,10}").prop_map(|(t, s)| format!(
            "data: {{\"theme\":\"{t}\",\"status_message\":\"{s}\"}}"
        )),
        (arb_theme(), "[a-zA-Z ]{0,10}").prop_map(|(t, s)| format!(
            "data: {{\"type\":\"ui_update\",\"data\":{{\"theme\":\"{t}\",\"status_message\":\"{s}\"}}}}"
        )),
        Just("data: {broken".to_string()),
        Just(": keep-alive".to_string()),
        Just(String::new()),
    ]
}

fn arb_line_ending() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\r\n")]
}

fn text_body() -> impl Strategy<Value = Vec<u8>> {
    (
        prop::collection::vec((arb_text_payload(), arb_line_ending()), 0..8),
        any::<bool>(),
    )
        .prop_map(|(lines, done)| {
            let mut body = String::new();
            for (payload, eol) in lines {
                body.push_str("data: ");
                body.push_str(&payload);
                body.push_str(eol);
            }
            if done {
                body.push_str("data: [DONE]\n");
            }
            body.into_bytes()
        })
}

fn structured_body() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(arb_structured_line(), 0..8).prop_map(|lines| {
        let mut body = lines.join("\n");
        body.push('\n');
        body.into_bytes()
    })
}

/// Cut `body` at the given relative positions.
fn split(body: &[u8], cuts: &[prop::sample::Index]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(body.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();
    let mut chunks = Vec::new();
    let mut start = 0;
    for p in points {
        chunks.push(body[start..p].to_vec());
        start = p;
    }
    chunks.push(body[start..].to_vec());
    chunks
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run_session(mode: SessionMode, chunks: Vec<Vec<u8>>) -> SessionSnapshot {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async move {
        let mut session = StreamSession::new(mode, DecodeOptions::default());
        let handle = session.handle();
        session.run(ScriptedSource::new(chunks)).await.unwrap();
        handle.snapshot()
    })
}

/// Everything but the random id and the transport-dependent chunk counters.
fn observable(snap: &SessionSnapshot) -> impl PartialEq + std::fmt::Debug {
    (
        snap.status,
        snap.view.clone(),
        snap.reports.clone(),
        snap.stats.events,
        snap.stats.counts.clone(),
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn text_session_ignores_chunk_boundaries(
        body in text_body(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let whole = run_session(SessionMode::FreeText, vec![body.clone()]);
        let pieces = run_session(SessionMode::FreeText, split(&body, &cuts));
        prop_assert_eq!(observable(&whole), observable(&pieces));
    }

    #[test]
    fn structured_session_ignores_chunk_boundaries(
        body in structured_body(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let whole = run_session(SessionMode::Structured, vec![body.clone()]);
        let pieces = run_session(SessionMode::Structured, split(&body, &cuts));
        prop_assert_eq!(observable(&whole), observable(&pieces));
    }

    #[test]
    fn session_matches_manual_fold(body in text_body()) {
        let events = WireDecoder::new(SessionMode::FreeText, DecodeOptions::default())
            .decode_all([body.as_slice()]);
        let mut text = String::new();
        for event in &events {
            let r = reduce_text(text, event);
            text = r.state;
            if r.completed {
                break;
            }
        }
        let snap = run_session(SessionMode::FreeText, vec![body]);
        prop_assert_eq!(snap.view.text(), Some(text.as_str()));
    }

    #[test]
    fn visible_dashboard_is_always_valid(body in structured_body()) {
        let snap = run_session(SessionMode::Structured, vec![body]);
        let dashboard = snap.view.dashboard().cloned().unwrap();
        let doc = serde_json::to_value(&dashboard).unwrap();
        prop_assert_eq!(genui_core::validate_dashboard(&doc).unwrap(), dashboard);
    }

    #[test]
    fn trailing_policy_only_affects_the_last_line(body in text_body()) {
        let mut tail = body.clone();
        tail.extend_from_slice(b"data: tail");
        let flush = WireDecoder::new(SessionMode::FreeText, DecodeOptions::default())
            .decode_all([tail.as_slice()]);
        let discard = WireDecoder::new(
            SessionMode::FreeText,
            DecodeOptions { trailing_line: TrailingLinePolicy::Discard, ..DecodeOptions::default() },
        )
        .decode_all([tail.as_slice()]);
        prop_assert_eq!(flush.len(), discard.len() + 1);
        prop_assert_eq!(&flush[..discard.len()], &discard[..]);
    }
}

#[test]
fn dashboard_fold_skips_rejected_updates() {
    let body = concat!(
        "data: {\"theme\":\"dark\",\"status_message\":\"Night\"}\n",
        "data: {\"theme\":\"purple\",\"status_message\":\"x\"}\n",
        "data: {\"theme\":\"blue\"}\n",
    );
    let events = WireDecoder::new(SessionMode::Structured, DecodeOptions::default())
        .decode_all([body.as_bytes()]);
    let mut state = DashboardState::default();
    let mut rejected = 0;
    for event in &events {
        let r = reduce_dashboard(state, event);
        state = r.state;
        rejected += usize::from(r.report.is_some());
    }
    assert_eq!(state, DashboardState::new(Theme::Dark, "Night"));
    assert_eq!(rejected, 2);
}
