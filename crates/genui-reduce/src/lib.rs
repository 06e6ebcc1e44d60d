// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pure reducers over classified [`Event`]s.
//!
//! Each reducer takes the previous state by value plus one event and returns
//! a [`Reduction`]: the next state, an optional [`ErrorReport`] for a problem
//! that was absorbed, and whether the event marked the end of the stream.
//! State is never partially updated; on any error the previous state comes
//! back unchanged.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use genui_core::{
    DashboardState, Event, FieldViolation, MalformedReason, unwrap_envelope, validate_dashboard,
};
use genui_error::{ErrorCode, ErrorReport};
use serde_json::Value;

/// Longest `raw` excerpt copied into a report's context, in characters.
const RAW_EXCERPT_CHARS: usize = 256;

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction<S> {
    /// State after the event.
    pub state: S,
    /// Recoverable problem encountered, if any.
    pub report: Option<ErrorReport>,
    /// `true` when the event was the stream terminator.
    pub completed: bool,
}

impl<S> Reduction<S> {
    /// State replaced or extended, nothing to report.
    pub fn applied(state: S) -> Self {
        Self {
            state,
            report: None,
            completed: false,
        }
    }

    /// State unchanged and the stream is over.
    pub fn completed(state: S) -> Self {
        Self {
            state,
            report: None,
            completed: true,
        }
    }

    /// State unchanged, with a report.
    pub fn rejected(state: S, report: ErrorReport) -> Self {
        Self {
            state,
            report: Some(report),
            completed: false,
        }
    }

    /// Map the state, keeping the report and completion flag.
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Reduction<T> {
        Reduction {
            state: f(self.state),
            report: self.report,
            completed: self.completed,
        }
    }
}

/// Fold one event into accumulated free text.
///
/// Text deltas append; the terminator marks completion. Structured payloads
/// do not belong in a free-text stream and are reported as protocol
/// violations, malformed frames as decode errors.
pub fn reduce_text(prev: String, event: &Event) -> Reduction<String> {
    match event {
        Event::TextDelta { text } => {
            let mut next = prev;
            next.push_str(text);
            Reduction::applied(next)
        }
        Event::Terminator => Reduction::completed(prev),
        Event::StructuredPayload { .. } => Reduction::rejected(
            prev,
            protocol_violation("structured payload in a free-text stream", event),
        ),
        Event::Malformed { raw, reason } => Reduction::rejected(prev, malformed_report(raw, reason)),
    }
}

/// Fold one event into the dashboard.
///
/// A structured payload is validated again before it replaces the whole
/// state, so this reducer never trusts its input.
pub fn reduce_dashboard(prev: DashboardState, event: &Event) -> Reduction<DashboardState> {
    match event {
        Event::StructuredPayload { payload } => match validate_dashboard(payload) {
            Ok(next) => Reduction::applied(next),
            Err(violations) => Reduction::rejected(prev, schema_report(&violations)),
        },
        Event::Terminator => Reduction::completed(prev),
        Event::TextDelta { .. } => Reduction::rejected(
            prev,
            protocol_violation("text delta in a structured stream", event),
        ),
        Event::Malformed { raw, reason } => Reduction::rejected(prev, malformed_report(raw, reason)),
    }
}

/// Apply one complete, non-streamed JSON document to the dashboard.
///
/// The document goes through the same envelope and schema gate as streamed
/// structured frames.
pub fn reduce_document(prev: DashboardState, doc: &Value) -> Reduction<DashboardState> {
    let data = match unwrap_envelope(doc) {
        Ok(data) => data,
        Err(reason) => {
            let raw = doc.to_string();
            return Reduction::rejected(prev, malformed_report(&raw, &reason));
        }
    };
    match validate_dashboard(data) {
        Ok(next) => Reduction::applied(next),
        Err(violations) => Reduction::rejected(prev, schema_report(&violations)),
    }
}

/// Report for a payload that failed the dashboard schema.
///
/// The `fields` context lists every offending field; `violations` carries
/// the full detail.
pub fn schema_report(violations: &[FieldViolation]) -> ErrorReport {
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    ErrorReport::new(
        ErrorCode::SchemaValidation,
        format!("dashboard payload rejected: {}", fields.join(", ")),
    )
    .with_context("fields", &fields)
    .with_context("violations", violations)
}

/// Report for a frame that could not be classified.
///
/// Schema failures map to `SCHEMA_VALIDATION`; everything else is
/// `DECODE_MALFORMED`.
pub fn malformed_report(raw: &str, reason: &MalformedReason) -> ErrorReport {
    if let MalformedReason::Schema { violations } = reason {
        return schema_report(violations).with_context("raw", excerpt(raw));
    }
    ErrorReport::new(ErrorCode::DecodeMalformed, reason.to_string())
        .with_context("reason", reason)
        .with_context("raw", excerpt(raw))
}

fn protocol_violation(message: &str, event: &Event) -> ErrorReport {
    ErrorReport::new(ErrorCode::ProtocolViolation, message).with_context("event", event.kind_name())
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(RAW_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genui_core::Theme;
    use serde_json::json;

    #[test]
    fn text_appends_in_order() {
        let r = reduce_text(String::new(), &Event::text("Hello "));
        let r = reduce_text(r.state, &Event::text("world"));
        assert_eq!(r.state, "Hello world");
        assert!(r.report.is_none());
        assert!(!r.completed);
    }

    #[test]
    fn text_terminator_is_noop_and_completes() {
        let r = reduce_text("done".into(), &Event::Terminator);
        assert_eq!(r.state, "done");
        assert!(r.completed);
        assert!(r.report.is_none());
    }

    #[test]
    fn structured_event_in_text_is_protocol_violation() {
        let r = reduce_text(
            "keep".into(),
            &Event::StructuredPayload {
                payload: json!({"theme": "dark", "status_message": "x"}),
            },
        );
        assert_eq!(r.state, "keep");
        let report = r.report.unwrap();
        assert_eq!(report.code, ErrorCode::ProtocolViolation);
        assert_eq!(report.context["event"], "structured_payload");
    }

    #[test]
    fn malformed_in_text_is_decode_error() {
        let r = reduce_text(
            "keep".into(),
            &Event::Malformed {
                raw: "\u{fffd}".into(),
                reason: MalformedReason::InvalidUtf8 {
                    detail: "invalid utf-8 sequence of 1 bytes from index 0".into(),
                },
            },
        );
        assert_eq!(r.state, "keep");
        assert_eq!(r.report.unwrap().code, ErrorCode::DecodeMalformed);
    }

    #[test]
    fn dashboard_is_replaced_wholesale() {
        let prev = DashboardState::new(Theme::Blue, "old");
        let r = reduce_dashboard(
            prev,
            &Event::StructuredPayload {
                payload: json!({"theme": "red", "status_message": "Alert"}),
            },
        );
        assert_eq!(r.state, DashboardState::new(Theme::Red, "Alert"));
        assert!(r.report.is_none());
    }

    #[test]
    fn invalid_payload_leaves_dashboard_untouched() {
        let prev = DashboardState::new(Theme::Dark, "stay");
        let r = reduce_dashboard(
            prev.clone(),
            &Event::StructuredPayload {
                payload: json!({"theme": "purple", "status_message": "x"}),
            },
        );
        assert_eq!(r.state, prev);
        let report = r.report.unwrap();
        assert_eq!(report.code, ErrorCode::SchemaValidation);
        assert_eq!(report.context["fields"], json!(["theme"]));
    }

    #[test]
    fn text_delta_in_dashboard_is_protocol_violation() {
        let r = reduce_dashboard(DashboardState::default(), &Event::text("hi"));
        assert_eq!(r.state, DashboardState::default());
        assert_eq!(r.report.unwrap().code, ErrorCode::ProtocolViolation);
    }

    #[test]
    fn dashboard_terminator_completes() {
        let r = reduce_dashboard(DashboardState::default(), &Event::Terminator);
        assert!(r.completed);
        assert_eq!(r.state, DashboardState::default());
    }

    #[test]
    fn document_with_error_envelope_is_rejected() {
        let r = reduce_document(
            DashboardState::default(),
            &json!({"type": "error", "message": "No UI update triggered"}),
        );
        assert_eq!(r.state, DashboardState::default());
        let report = r.report.unwrap();
        assert_eq!(report.code, ErrorCode::DecodeMalformed);
        assert!(report.message.contains("No UI update triggered"));
    }

    #[test]
    fn document_envelope_is_applied() {
        let r = reduce_document(
            DashboardState::default(),
            &json!({"type": "ui_update", "data": {"theme": "dark", "status_message": "Night Watch"}}),
        );
        assert_eq!(r.state, DashboardState::new(Theme::Dark, "Night Watch"));
    }

    #[test]
    fn raw_excerpt_is_bounded() {
        let raw = "x".repeat(1000);
        let report = malformed_report(
            &raw,
            &MalformedReason::InvalidJson {
                detail: "expected value".into(),
            },
        );
        assert_eq!(report.context["raw"].as_str().unwrap().len(), RAW_EXCERPT_CHARS);
    }

    #[test]
    fn map_keeps_report_and_flag() {
        let r = Reduction::rejected(1, ErrorReport::new(ErrorCode::Internal, "x")).map(|n| n + 1);
        assert_eq!(r.state, 2);
        assert!(r.report.is_some());
    }
}
