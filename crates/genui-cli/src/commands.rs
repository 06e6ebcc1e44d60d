// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared command implementations for the genui CLI.
//!
//! These functions are library-level so they can be tested without
//! spawning the binary.

use anyhow::{Context, Result};
use genui_config::{GenUiConfig, load_config, validate_config};
use genui_core::{DashboardState, SessionMode, Theme};
use genui_error::ErrorReport;
use genui_http::BackendClient;
use genui_reduce::reduce_document;
use genui_session::{ScriptedSource, SessionController, SessionSnapshot, StreamSession};
use genui_wire::DecodeOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Load the configuration and reject it if it does not validate.
///
/// Warnings are logged, not returned.
pub fn resolve_config(path: Option<&Path>) -> Result<GenUiConfig> {
    let config = load_config(path).context("load configuration")?;
    let warnings = validate_config(&config).context("validate configuration")?;
    for w in &warnings {
        warn!(target: "genui.cli", "{w}");
    }
    Ok(config)
}

/// Load and validate a configuration file.
///
/// Returns a list of human-readable diagnostic messages (errors and warnings).
pub fn config_check(path: Option<&Path>) -> Vec<String> {
    let mut diagnostics = Vec::new();

    let config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            diagnostics.push(format!("error: {e}"));
            return diagnostics;
        }
    };

    match validate_config(&config) {
        Ok(warnings) => {
            diagnostics.extend(warnings.iter().map(|w| format!("warning: {w}")));
            diagnostics.push("config: ok".into());
        }
        Err(e) => diagnostics.push(format!("error: {e}")),
    }

    diagnostics
}

/// Feed a captured SSE body through a session and return its final snapshot.
pub async fn replay(
    body: &[u8],
    mode: SessionMode,
    chunk_size: usize,
    options: DecodeOptions,
) -> Result<SessionSnapshot> {
    anyhow::ensure!(chunk_size > 0, "chunk size must be at least 1");
    let mut session = StreamSession::new(mode, options);
    let handle = session.handle();
    let status = session
        .run(ScriptedSource::chunked(body, chunk_size))
        .await?;
    info!(target: "genui.cli", %status, bytes = body.len(), "replay finished");
    Ok(handle.snapshot())
}

/// Dashboard a `ui` command starts from.
pub fn prior_dashboard(theme: Option<Theme>, status: Option<String>) -> DashboardState {
    let base = DashboardState::default();
    DashboardState::new(
        theme.unwrap_or(base.theme),
        status.unwrap_or(base.status_message),
    )
}

/// Fetch one structured document and apply it to `prior`.
///
/// A rejected document leaves `prior` in place and comes back as the report.
pub async fn apply_ui_document(
    client: &BackendClient,
    message: &str,
    prior: DashboardState,
) -> Result<(DashboardState, Option<ErrorReport>)> {
    let doc = client.ui_document(message).await?;
    let r = reduce_document(prior, &doc);
    Ok((r.state, r.report))
}

/// Why a stream was stopped from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The `--timeout` elapsed.
    Timeout,
    /// Ctrl-C.
    Interrupt,
}

/// Stream a free-text answer, writing each delta to `out` as it is applied.
///
/// The session is cancelled when `timeout` elapses or on Ctrl-C; text
/// applied up to that point is still written.
pub async fn stream_text<W: Write>(
    client: &BackendClient,
    message: &str,
    options: DecodeOptions,
    timeout: Option<Duration>,
    out: &mut W,
) -> Result<(SessionSnapshot, Option<StopReason>)> {
    let mut controller = SessionController::new(options);
    let handle = controller
        .start(SessionMode::FreeText, client.stream(message))
        .await;
    let mut rx = handle.subscribe();
    let mut printed = 0usize;

    let follow = async {
        loop {
            let done = {
                let snap = rx.borrow_and_update();
                if let Some(text) = snap.view.text()
                    && text.len() > printed
                {
                    out.write_all(text[printed..].as_bytes())?;
                    out.flush()?;
                    printed = text.len();
                }
                snap.status.is_terminal()
            };
            if done || rx.changed().await.is_err() {
                return Ok::<(), std::io::Error>(());
            }
        }
    };
    let deadline = async {
        match timeout {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };

    let stopped = tokio::select! {
        r = follow => {
            r.context("write streamed text")?;
            None
        }
        () = deadline => Some(StopReason::Timeout),
        _ = tokio::signal::ctrl_c() => Some(StopReason::Interrupt),
    };
    if let Some(reason) = stopped {
        info!(target: "genui.cli", ?reason, "cancelling stream");
        controller.cancel();
    }

    let snapshot = controller
        .wait()
        .await
        .context("stream session disappeared")?;
    if let Some(text) = snapshot.view.text()
        && text.len() > printed
    {
        out.write_all(text[printed..].as_bytes())?;
    }
    writeln!(out)?;
    Ok((snapshot, stopped))
}
