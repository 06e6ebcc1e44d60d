// SPDX-License-Identifier: MIT OR Apache-2.0
//! Owner of the one live session for a caller.

use genui_core::{DashboardState, SessionMode, SessionStatus};
use genui_error::GenUiError;
use genui_wire::DecodeOptions;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::session::{SessionHandle, SessionSnapshot, SessionView, StreamSession};
use crate::source::ByteSource;

struct Running {
    handle: SessionHandle,
    task: JoinHandle<Result<SessionStatus, GenUiError>>,
}

/// Runs at most one session at a time on behalf of one caller.
///
/// Starting a new session cancels the previous one and waits for its task to
/// stop before the new one is spawned. The visible dashboard is carried from
/// one structured session into the next.
pub struct SessionController {
    options: DecodeOptions,
    dashboard: DashboardState,
    current: Option<Running>,
}

impl SessionController {
    /// Create a controller with no session.
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            dashboard: DashboardState::default(),
            current: None,
        }
    }

    /// Seed the dashboard the next structured session starts from.
    #[must_use]
    pub fn with_dashboard(mut self, dashboard: DashboardState) -> Self {
        self.dashboard = dashboard;
        self
    }

    /// Retire the current session, then start a new one reading `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start<S>(&mut self, mode: SessionMode, source: S) -> SessionHandle
    where
        S: ByteSource + 'static,
    {
        self.retire().await;

        let mut session = StreamSession::new(mode, self.options);
        if mode == SessionMode::Structured {
            session = session.with_dashboard(self.dashboard.clone());
        }
        let handle = session.handle();
        debug!(target: "genui.session", id = %handle.id(), %mode, "spawning session");
        let task = tokio::spawn(async move { session.run(source).await });
        self.current = Some(Running {
            handle: handle.clone(),
            task,
        });
        handle
    }

    /// Handle of the current session, if any.
    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref().map(|r| &r.handle)
    }

    /// Cancel the current session without waiting for it.
    pub fn cancel(&self) -> bool {
        self.current.as_ref().is_some_and(|r| r.handle.cancel())
    }

    /// Wait for the current session to stop and return its final snapshot.
    ///
    /// The controller no longer owns a session afterwards.
    pub async fn wait(&mut self) -> Option<SessionSnapshot> {
        let running = self.current.take()?;
        match running.task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(target: "genui.session", error = %e, "session did not run"),
            Err(e) => error!(target: "genui.session", error = %e, "session task aborted"),
        }
        let snapshot = running.handle.snapshot();
        if let SessionView::Dashboard(d) = &snapshot.view {
            self.dashboard = d.clone();
        }
        Some(snapshot)
    }

    /// Cancel the current session and wait for its task to drain.
    pub async fn retire(&mut self) -> Option<SessionSnapshot> {
        self.cancel();
        self.wait().await
    }

    /// The visible dashboard: the live structured session's, else the carried one.
    pub fn dashboard(&self) -> DashboardState {
        self.current
            .as_ref()
            .and_then(|r| r.handle.snapshot().view.dashboard().cloned())
            .unwrap_or_else(|| self.dashboard.clone())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, ScriptedSource};
    use genui_core::Theme;

    #[tokio::test]
    async fn dashboard_carries_into_next_session() {
        let mut c = SessionController::new(DecodeOptions::default());
        c.start(
            SessionMode::Structured,
            ScriptedSource::new([
                "data: {\"theme\":\"dark\",\"status_message\":\"Night Watch\"}\ndata: [DONE]\n",
            ]),
        )
        .await;
        let snap = c.wait().await.unwrap();
        assert_eq!(snap.status, SessionStatus::Completed);
        assert_eq!(c.dashboard(), DashboardState::new(Theme::Dark, "Night Watch"));

        let (_tx, source) = ChannelSource::new(1);
        let h = c.start(SessionMode::Structured, source).await;
        assert_eq!(
            h.snapshot().view.dashboard(),
            Some(&DashboardState::new(Theme::Dark, "Night Watch"))
        );
        let last = c.retire().await.unwrap();
        assert_eq!(last.status, SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn start_cancels_previous_session() {
        let mut c = SessionController::new(DecodeOptions::default());
        let (tx, source) = ChannelSource::new(4);
        let first = c.start(SessionMode::FreeText, source).await;
        tx.send(Ok(b"data: A\n".to_vec())).await.unwrap();
        first
            .subscribe()
            .wait_for(|s| s.view.text() == Some("A"))
            .await
            .unwrap();

        let second = c
            .start(SessionMode::FreeText, ScriptedSource::new(["data: B\n"]))
            .await;
        assert_eq!(first.status(), SessionStatus::Cancelled);
        assert_eq!(first.snapshot().view.text(), Some("A"));

        let _ = tx.send(Ok(b"data: late\n".to_vec())).await;
        let snap = c.wait().await.unwrap();
        assert_eq!(snap.id, second.id());
        assert_eq!(snap.view.text(), Some("B"));
        assert_eq!(first.snapshot().view.text(), Some("A"));
    }

    #[tokio::test]
    async fn wait_without_session_is_none() {
        let mut c = SessionController::new(DecodeOptions::default());
        assert!(c.wait().await.is_none());
        assert!(!c.cancel());
        assert_eq!(c.dashboard(), DashboardState::default());
    }
}
