// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors crossing crate boundaries: source chains and serialized reports.

use genui_error::{ErrorCategory, ErrorCode, ErrorReport, GenUiError};
use serde_json::json;
use std::io;

fn read_chunk() -> Result<Vec<u8>, GenUiError> {
    let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "peer reset");
    Err(
        GenUiError::new(ErrorCode::TransportRead, "reading body failed")
            .with_context("url", "http://localhost:8000/api/level2/stream")
            .with_source(io_err),
    )
}

fn drive() -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let chunk = read_chunk()?;
    Ok(chunk.len())
}

#[test]
fn boxed_error_keeps_source_chain() {
    let err = drive().unwrap_err();
    assert!(err.to_string().starts_with("[TRANSPORT_READ] reading body failed"));
    let source = err.source().expect("io source");
    assert_eq!(source.to_string(), "peer reset");
}

#[test]
fn report_parses_back_from_json() {
    let err = read_chunk().unwrap_err();
    let report = err.report();
    let text = serde_json::to_string(&report).unwrap();
    let back: ErrorReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.source_message.as_deref(), Some("peer reset"));
}

#[test]
fn report_accepts_minimal_json() {
    let report: ErrorReport =
        serde_json::from_value(json!({"code": "SCHEMA_VALIDATION", "message": "bad theme"}))
            .unwrap();
    assert_eq!(report.code.category(), ErrorCategory::Schema);
    assert!(report.context.is_empty());
    assert!(!report.code.is_fatal());
}

#[test]
fn unknown_code_is_rejected() {
    let res = serde_json::from_value::<ErrorReport>(json!({"code": "TEAPOT", "message": ""}));
    assert!(res.is_err());
}

#[test]
fn nested_context_values() {
    let report = ErrorReport::new(ErrorCode::SchemaValidation, "dashboard payload rejected")
        .with_context("fields", vec!["theme", "status_message"])
        .with_context("violations", json!([{"field": "theme", "problem": "x"}]));
    assert_eq!(report.context["fields"], json!(["theme", "status_message"]));
    assert_eq!(report.context["violations"][0]["field"], "theme");
}
