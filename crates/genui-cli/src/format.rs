// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting for the genui CLI.

use genui_core::DashboardState;
use genui_error::ErrorReport;
use genui_session::{SessionSnapshot, SessionView};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Supported output formats for CLI display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Compact JSON (single line).
    Json,
    /// Pretty-printed JSON.
    #[default]
    JsonPretty,
    /// Human-readable multi-line text.
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::JsonPretty => "json-pretty",
            Self::Text => "text",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "json-pretty" | "json_pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Formats session results for CLI output.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Create a new formatter with the given output format.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a final [`SessionSnapshot`].
    #[must_use]
    pub fn format_snapshot(&self, snapshot: &SessionSnapshot) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(snapshot).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(snapshot).unwrap_or_default(),
            OutputFormat::Text => format_snapshot_text(snapshot),
        }
    }

    /// Format a [`DashboardState`].
    #[must_use]
    pub fn format_dashboard(&self, dashboard: &DashboardState) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(dashboard).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(dashboard).unwrap_or_default(),
            OutputFormat::Text => format!(
                "theme: {}\nstatus: {}",
                dashboard.theme, dashboard.status_message
            ),
        }
    }

    /// Format an [`ErrorReport`] for stderr.
    #[must_use]
    pub fn format_report(&self, report: &ErrorReport) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => {
                serde_json::to_string(report).unwrap_or_default()
            }
            OutputFormat::Text => format!("error: {report}"),
        }
    }
}

fn format_snapshot_text(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "session: {}", snapshot.id);
    let _ = writeln!(out, "mode:    {}", snapshot.mode);
    let _ = writeln!(out, "status:  {}", snapshot.status);
    match &snapshot.view {
        SessionView::Text(text) => {
            let _ = writeln!(out, "text:    {text:?}");
        }
        SessionView::Dashboard(d) => {
            let _ = writeln!(out, "theme:   {}", d.theme);
            let _ = writeln!(out, "message: {}", d.status_message);
        }
    }
    let _ = writeln!(
        out,
        "events:  {} ({} malformed) from {} chunks, {} bytes",
        snapshot.stats.events, snapshot.stats.malformed, snapshot.stats.chunks, snapshot.stats.bytes
    );
    for report in &snapshot.reports {
        let _ = writeln!(out, "report:  {report}");
    }
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "error:   {error}");
    }
    out.trim_end().to_string()
}
