// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy with stable error codes for genui streaming sessions.
//!
//! Every error carries an [`ErrorCode`] (a machine-readable, stable string
//! tag), a human-readable message, an optional cause, and arbitrary
//! key-value context. Only transport errors are fatal to a session; every
//! other code is absorbed by the reducers and surfaced as an [`ErrorReport`]
//! next to the otherwise unaffected state.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Connection, status, or read failures of the byte channel.
    Transport,
    /// Frames or payloads that cannot be classified.
    Decode,
    /// Structured payloads that fail the dashboard schema.
    Schema,
    /// Events that are invalid for the session's declared mode.
    Protocol,
    /// Session lifecycle misuse.
    Session,
    /// Configuration errors.
    Config,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transport => "transport",
            Self::Decode => "decode",
            Self::Schema => "schema",
            Self::Protocol => "protocol",
            Self::Session => "session",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Transport --
    /// The connection could not be established or dropped mid-stream.
    TransportConnect,
    /// The backend answered with a non-success status.
    TransportStatus,
    /// Reading the next chunk from the channel failed.
    TransportRead,

    // -- Decode --
    /// A frame or payload could not be classified.
    DecodeMalformed,

    // -- Schema --
    /// A structured payload failed dashboard validation.
    SchemaValidation,

    // -- Protocol --
    /// An event kind arrived that the session's mode does not accept.
    ProtocolViolation,

    // -- Session --
    /// A lifecycle operation was attempted from the wrong state.
    SessionInvalidState,

    // -- Config --
    /// Configuration file or value is invalid.
    ConfigInvalid,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportConnect | Self::TransportStatus | Self::TransportRead => {
                ErrorCategory::Transport
            }
            Self::DecodeMalformed => ErrorCategory::Decode,
            Self::SchemaValidation => ErrorCategory::Schema,
            Self::ProtocolViolation => ErrorCategory::Protocol,
            Self::SessionInvalidState => ErrorCategory::Session,
            Self::ConfigInvalid => ErrorCategory::Config,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Whether an error with this code terminates the session.
    ///
    /// Only transport failures are escalated; decode, schema and protocol
    /// problems are absorbed by the reducers.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// Stable `&'static str` representation of the code (e.g.
    /// `"SCHEMA_VALIDATION"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportConnect => "TRANSPORT_CONNECT",
            Self::TransportStatus => "TRANSPORT_STATUS",
            Self::TransportRead => "TRANSPORT_READ",
            Self::DecodeMalformed => "DECODE_MALFORMED",
            Self::SchemaValidation => "SCHEMA_VALIDATION",
            Self::ProtocolViolation => "PROTOCOL_VIOLATION",
            Self::SessionInvalidState => "SESSION_INVALID_STATE",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GenUiError
// ---------------------------------------------------------------------------

/// Unified genui error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use genui_error::{ErrorCode, GenUiError};
///
/// let err = GenUiError::new(ErrorCode::TransportStatus, "backend answered 502")
///     .with_context("status", 502)
///     .with_context("endpoint", "/api/level2/stream");
/// assert!(err.code.is_fatal());
/// ```
pub struct GenUiError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl GenUiError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Snapshot this error as a cloneable [`ErrorReport`].
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from(self)
    }
}

impl fmt::Debug for GenUiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("GenUiError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for GenUiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // BTreeMap keeps the rendering deterministic.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for GenUiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// ErrorReport
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`GenUiError`] (without the opaque source).
///
/// This is what sessions and reducers hand back as metadata for recoverable
/// problems, and what a failed session carries as its terminal error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorReport {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl ErrorReport {
    /// Build a report directly, without going through [`GenUiError`].
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: BTreeMap::new(),
            source_message: None,
        }
    }

    /// Attach a key-value pair to the report context.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl From<&GenUiError> for ErrorReport {
    fn from(err: &GenUiError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<ErrorReport> for GenUiError {
    fn from(report: ErrorReport) -> Self {
        Self {
            code: report.code,
            message: report.message,
            source: None,
            context: report.context,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
