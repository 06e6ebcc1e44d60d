// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single stream session and its observable snapshot.

use genui_core::{DashboardState, Event, SessionMode, SessionStatus};
use genui_error::{ErrorCode, ErrorReport, GenUiError};
use genui_reduce::{Reduction, reduce_dashboard, reduce_text};
use genui_wire::{DecodeOptions, WireDecoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::source::ByteSource;
use crate::stats::SessionStats;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The state a session renders: text or dashboard, depending on its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionView {
    /// Accumulated free text.
    Text(String),
    /// Current dashboard.
    Dashboard(DashboardState),
}

impl SessionView {
    /// Initial view for `mode`.
    pub fn initial(mode: SessionMode) -> Self {
        match mode {
            SessionMode::FreeText => Self::Text(String::new()),
            SessionMode::Structured => Self::Dashboard(DashboardState::default()),
        }
    }

    /// Accumulated text, for free-text sessions.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Dashboard(_) => None,
        }
    }

    /// Current dashboard, for structured sessions.
    pub fn dashboard(&self) -> Option<&DashboardState> {
        match self {
            Self::Dashboard(d) => Some(d),
            Self::Text(_) => None,
        }
    }

    /// Fold one event into the view with the reducer for its mode.
    pub fn apply(self, event: &Event) -> Reduction<SessionView> {
        match self {
            Self::Text(text) => reduce_text(text, event).map(Self::Text),
            Self::Dashboard(d) => reduce_dashboard(d, event).map(Self::Dashboard),
        }
    }
}

/// Everything an observer can see about a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,
    /// Mode fixed at creation.
    pub mode: SessionMode,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Rendered state.
    pub view: SessionView,
    /// Recoverable problems absorbed while reducing, in arrival order.
    pub reports: Vec<ErrorReport>,
    /// The error that failed the session, if any.
    pub error: Option<ErrorReport>,
    /// Counters.
    pub stats: SessionStats,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Shared {
    id: Uuid,
    tx: watch::Sender<SessionSnapshot>,
    cancel: CancelToken,
}

impl Shared {
    /// Run `f` on the snapshot if the session is still live.
    ///
    /// The status and cancel checks happen under the watch lock, the same
    /// lock [`Shared::cancel`] takes, so nothing lands after a cancel.
    fn mutate(&self, f: impl FnOnce(&mut SessionSnapshot)) -> bool {
        let cancel = &self.cancel;
        self.tx.send_if_modified(|snap| {
            if snap.status != SessionStatus::Active || cancel.is_cancelled() {
                return false;
            }
            f(snap);
            true
        })
    }

    fn transition(&self, from: SessionStatus, to: SessionStatus) -> bool {
        self.tx.send_if_modified(|snap| {
            if snap.status != from || !from.can_transition_to(to) {
                return false;
            }
            snap.status = to;
            true
        })
    }

    fn cancel(&self) -> bool {
        self.cancel.cancel();
        self.tx.send_if_modified(|snap| {
            if !snap.status.can_transition_to(SessionStatus::Cancelled) {
                return false;
            }
            snap.status = SessionStatus::Cancelled;
            true
        })
    }

    fn status(&self) -> SessionStatus {
        self.tx.borrow().status
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable view of a session: observe it, or cancel it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.shared.status()
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.tx.borrow().clone()
    }

    /// Receiver notified on every applied change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Cancel the session.
    ///
    /// An idle or active session becomes `Cancelled` and no further change is
    /// ever applied to it. Returns `false` if it had already finished.
    pub fn cancel(&self) -> bool {
        let cancelled = self.shared.cancel();
        if cancelled {
            info!(target: "genui.session", id = %self.shared.id, "session cancelled");
        }
        cancelled
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Wait until the session reaches a terminal status.
    ///
    /// Never resolves for a session that is never run or cancelled.
    pub async fn finished(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| s.status.is_terminal()).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

enum Flow {
    Continue,
    Stop,
}

/// One request/response lifecycle: decode a byte source into session state.
#[derive(Debug)]
pub struct StreamSession {
    shared: Arc<Shared>,
    decoder: WireDecoder,
}

impl StreamSession {
    /// Create an idle session.
    pub fn new(mode: SessionMode, options: DecodeOptions) -> Self {
        let id = Uuid::new_v4();
        let (tx, _rx) = watch::channel(SessionSnapshot {
            id,
            mode,
            status: SessionStatus::Idle,
            view: SessionView::initial(mode),
            reports: Vec::new(),
            error: None,
            stats: SessionStats::new(),
        });
        Self {
            shared: Arc::new(Shared {
                id,
                tx,
                cancel: CancelToken::new(),
            }),
            decoder: WireDecoder::new(mode, options),
        }
    }

    /// Start a structured session from `initial` instead of the default dashboard.
    ///
    /// Has no effect on free-text sessions.
    #[must_use]
    pub fn with_dashboard(self, initial: DashboardState) -> Self {
        self.shared.tx.send_modify(|snap| {
            if snap.mode == SessionMode::Structured {
                snap.view = SessionView::Dashboard(initial);
            }
        });
        self
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Mode fixed at creation.
    pub fn mode(&self) -> SessionMode {
        self.decoder.mode()
    }

    /// A handle for observing and cancelling this session.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Start the session and drive it to a terminal status.
    ///
    /// Only valid from `Idle`; any other status yields
    /// `SESSION_INVALID_STATE` and changes nothing. Transport problems do not
    /// surface here: they end the session as `Failed`, with the error in the
    /// snapshot.
    pub async fn run<S>(&mut self, mut source: S) -> Result<SessionStatus, GenUiError>
    where
        S: ByteSource,
    {
        let id = self.shared.id;
        if !self
            .shared
            .transition(SessionStatus::Idle, SessionStatus::Active)
        {
            let status = self.shared.status();
            return Err(GenUiError::new(
                ErrorCode::SessionInvalidState,
                format!("cannot start a session that is {status}"),
            )
            .with_context("session_id", id.to_string())
            .with_context("status", status));
        }
        info!(target: "genui.session", %id, mode = %self.mode(), "session started");

        let cancel = self.shared.cancel.clone();
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.shared.status()),
            r = source.open() => r,
        };
        if let Err(err) = opened {
            return Ok(self.fail(err));
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.stopped()),
                r = source.next_chunk() => r,
            };
            if cancel.is_cancelled() {
                return Ok(self.stopped());
            }

            match next {
                Ok(Some(chunk)) => {
                    let events = self.decoder.push(&chunk);
                    debug!(
                        target: "genui.session",
                        %id,
                        bytes = chunk.len(),
                        events = events.len(),
                        "chunk read"
                    );
                    if !self.shared.mutate(|s| s.stats.observe_chunk(chunk.len())) {
                        return Ok(self.stopped());
                    }
                    if let Flow::Stop = self.apply(events) {
                        return Ok(self.shared.status());
                    }
                }
                Ok(None) => {
                    let events = self.decoder.finish();
                    if let Flow::Stop = self.apply(events) {
                        return Ok(self.shared.status());
                    }
                    if self
                        .shared
                        .transition(SessionStatus::Active, SessionStatus::Completed)
                    {
                        info!(target: "genui.session", %id, "stream ended without terminator");
                    }
                    return Ok(self.shared.status());
                }
                Err(err) => return Ok(self.fail(err)),
            }
        }
    }

    fn apply(&mut self, events: Vec<Event>) -> Flow {
        let id = self.shared.id;
        for event in events {
            let mut completed = false;
            let applied = self.shared.mutate(|snap| {
                snap.stats.observe(&event);
                let view = std::mem::replace(&mut snap.view, SessionView::Text(String::new()));
                let reduction = view.apply(&event);
                snap.view = reduction.state;
                if let Some(report) = reduction.report {
                    warn!(target: "genui.session", %id, code = %report.code, "{}", report.message);
                    snap.reports.push(report);
                }
                if reduction.completed {
                    snap.status = SessionStatus::Completed;
                    completed = true;
                }
            });
            if !applied {
                debug!(target: "genui.session", %id, "session no longer active; event discarded");
                self.decoder.reset();
                return Flow::Stop;
            }
            if completed {
                info!(target: "genui.session", %id, "session completed");
                self.decoder.reset();
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn stopped(&mut self) -> SessionStatus {
        self.decoder.reset();
        debug!(target: "genui.session", id = %self.shared.id, "read loop stopped");
        self.shared.status()
    }

    fn fail(&mut self, err: GenUiError) -> SessionStatus {
        let report = err.report();
        let failed = self.shared.mutate(|snap| {
            snap.status = SessionStatus::Failed;
            snap.error = Some(report);
        });
        if failed {
            warn!(target: "genui.session", id = %self.shared.id, error = %err, "session failed");
        }
        self.decoder.reset();
        self.shared.status()
    }
}
