// SPDX-License-Identifier: MIT OR Apache-2.0
//! BDD scenarios for streaming sessions: chunk reassembly, the dashboard
//! schema gate, terminator stability and cancellation.

use cucumber::{World as _, given, then, when};
use genui_core::{DashboardState, SessionMode, SessionStatus, Theme};
use genui_session::{ChannelSource, ScriptedSource, SessionSnapshot, StreamSession};
use genui_wire::DecodeOptions;
use serde_json::json;

#[derive(Debug, Default, cucumber::World)]
struct StreamWorld {
    mode: Option<SessionMode>,
    prior: Option<DashboardState>,
    chunks: Vec<Vec<u8>>,
    /// Cancel once this many chunks are in and the text reads as given.
    cancel_at: Option<(usize, String)>,
    snapshot: Option<SessionSnapshot>,
}

impl StreamWorld {
    fn session(&self) -> StreamSession {
        let mode = self.mode.unwrap_or(SessionMode::FreeText);
        let session = StreamSession::new(mode, DecodeOptions::default());
        match &self.prior {
            Some(d) => session.with_dashboard(d.clone()),
            None => session,
        }
    }

    fn snapshot(&self) -> &SessionSnapshot {
        self.snapshot
            .as_ref()
            .expect("the stream has not ended yet")
    }
}

/// Feature-file escapes: `\n` is a line feed, `\\` a backslash.
fn chunk_bytes(raw: &str) -> Vec<u8> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out.into_bytes()
}

fn theme(name: &str) -> Theme {
    name.parse().unwrap_or_else(|e| panic!("{e}"))
}

// ---------------------------------------------------------------------------
// Given
// ---------------------------------------------------------------------------

#[given("a free-text session")]
async fn free_text_session(w: &mut StreamWorld) {
    w.mode = Some(SessionMode::FreeText);
}

#[given(expr = "a structured session showing theme {string} and status {string}")]
async fn structured_session(w: &mut StreamWorld, name: String, status: String) {
    w.mode = Some(SessionMode::Structured);
    w.prior = Some(DashboardState::new(theme(&name), status));
}

// ---------------------------------------------------------------------------
// When
// ---------------------------------------------------------------------------

#[when(regex = r"^the chunk '(.*)' arrives$")]
async fn chunk_arrives(w: &mut StreamWorld, raw: String) {
    w.chunks.push(chunk_bytes(&raw));
}

#[when(expr = "the session is cancelled once the text is {string}")]
async fn cancel_once(w: &mut StreamWorld, text: String) {
    w.cancel_at = Some((w.chunks.len(), text));
}

#[when("the stream ends")]
async fn stream_ends(w: &mut StreamWorld) {
    let mut session = w.session();
    let handle = session.handle();

    let Some((n, text)) = w.cancel_at.clone() else {
        session
            .run(ScriptedSource::new(w.chunks.clone()))
            .await
            .expect("session starts from idle");
        w.snapshot = Some(handle.snapshot());
        return;
    };

    let (tx, source) = ChannelSource::new(w.chunks.len().max(1));
    let task = tokio::spawn(async move { session.run(source).await });
    for chunk in &w.chunks[..n] {
        tx.send(Ok(chunk.clone())).await.expect("session is reading");
    }
    handle
        .subscribe()
        .wait_for(|s| s.view.text() == Some(text.as_str()))
        .await
        .expect("session is alive");
    assert!(handle.cancel());
    for chunk in &w.chunks[n..] {
        let _ = tx.send(Ok(chunk.clone())).await;
    }
    drop(tx);
    task.await
        .expect("session task panicked")
        .expect("session starts from idle");
    w.snapshot = Some(handle.snapshot());
}

// ---------------------------------------------------------------------------
// Then
// ---------------------------------------------------------------------------

#[then(expr = "the text is {string}")]
async fn text_is(w: &mut StreamWorld, expected: String) {
    assert_eq!(w.snapshot().view.text(), Some(expected.as_str()));
}

#[then(expr = "the text has {int} lines")]
async fn text_lines(w: &mut StreamWorld, lines: usize) {
    let text = w.snapshot().view.text().expect("free-text session");
    assert_eq!(text.lines().count(), lines, "text was {text:?}");
}

#[then(regex = r"^the session is (completed|cancelled|failed)$")]
async fn session_status(w: &mut StreamWorld, status: String) {
    let expected = match status.as_str() {
        "completed" => SessionStatus::Completed,
        "cancelled" => SessionStatus::Cancelled,
        _ => SessionStatus::Failed,
    };
    assert_eq!(w.snapshot().status, expected);
}

#[then(expr = "the dashboard shows theme {string} and status {string}")]
async fn dashboard_shows(w: &mut StreamWorld, name: String, status: String) {
    assert_eq!(
        w.snapshot().view.dashboard(),
        Some(&DashboardState::new(theme(&name), status))
    );
}

#[then(regex = r#"^a ([A-Z_]+) report names the field "(.*)"$"#)]
async fn report_names_field(w: &mut StreamWorld, code: String, field: String) {
    let report = w
        .snapshot()
        .reports
        .iter()
        .find(|r| r.code.as_str() == code)
        .unwrap_or_else(|| panic!("no {code} report in {:?}", w.snapshot().reports));
    let fields = &report.context["fields"];
    assert!(
        fields.as_array().is_some_and(|f| f.contains(&json!(field))),
        "fields were {fields}"
    );
}

#[then("no reports were made")]
async fn no_reports(w: &mut StreamWorld) {
    assert!(w.snapshot().reports.is_empty());
}

#[tokio::main]
async fn main() {
    StreamWorld::run("tests/features").await;
}
