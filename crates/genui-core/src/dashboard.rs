// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dashboard state, its schema gate, and the `ui_update` envelope.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::event::MalformedReason;

/// Discriminator value of a structured-update envelope.
pub const UI_UPDATE: &str = "ui_update";

const THEME_FIELD: &str = "theme";
const STATUS_FIELD: &str = "status_message";
const DASHBOARD_FIELDS: &[&str] = &[THEME_FIELD, STATUS_FIELD];

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Visual theme of the dashboard. Closed set; unknown names are rejected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Default theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
    /// Blue accent theme.
    Blue,
    /// Red alert theme.
    Red,
}

impl Theme {
    /// Every allowed theme, in declaration order.
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Blue, Theme::Red];

    /// Wire name of the theme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the [`Theme`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown theme '{}' (expected one of light, dark, blue, red)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// DashboardState
// ---------------------------------------------------------------------------

/// The externally visible dashboard.
///
/// Only ever replaced as a whole by a fully validated value; see
/// [`validate_dashboard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DashboardState {
    /// Active theme.
    pub theme: Theme,
    /// Free-form status line.
    pub status_message: String,
}

impl DashboardState {
    /// Build a dashboard state from parts.
    pub fn new(theme: Theme, status_message: impl Into<String>) -> Self {
        Self {
            theme,
            status_message: status_message.into(),
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Theme::Light, "System Normal")
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One violated schema rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Offending field (`$` for the document root).
    pub field: String,
    /// What is wrong with it.
    pub problem: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "required field is missing")
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a JSON value against the dashboard schema.
///
/// The value must be an object with exactly `theme` (one of the [`Theme`]
/// names) and `status_message` (a string). Every violated rule is reported.
pub fn validate_dashboard(value: &Value) -> Result<DashboardState, Vec<FieldViolation>> {
    let Some(obj) = value.as_object() else {
        return Err(vec![FieldViolation::new(
            "$",
            format!("expected an object, got {}", json_type(value)),
        )]);
    };

    let mut violations = Vec::new();

    let theme = match obj.get(THEME_FIELD) {
        None => {
            violations.push(FieldViolation::missing(THEME_FIELD));
            None
        }
        Some(Value::String(name)) => match name.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(e) => {
                violations.push(FieldViolation::new(THEME_FIELD, e.to_string()));
                None
            }
        },
        Some(other) => {
            violations.push(FieldViolation::new(
                THEME_FIELD,
                format!("expected a string, got {}", json_type(other)),
            ));
            None
        }
    };

    let status_message = match obj.get(STATUS_FIELD) {
        None => {
            violations.push(FieldViolation::missing(STATUS_FIELD));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(FieldViolation::new(
                STATUS_FIELD,
                format!("expected a string, got {}", json_type(other)),
            ));
            None
        }
    };

    for key in obj.keys() {
        if !DASHBOARD_FIELDS.contains(&key.as_str()) {
            violations.push(FieldViolation::new(key.as_str(), "unexpected field"));
        }
    }

    match (theme, status_message) {
        (Some(theme), Some(status_message)) if violations.is_empty() => Ok(DashboardState {
            theme,
            status_message,
        }),
        _ => Err(violations),
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A well-formed structured update as the backend sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UiEnvelope {
    /// Always [`UI_UPDATE`] for an update.
    #[serde(rename = "type")]
    pub kind: String,
    /// The replacement dashboard.
    pub data: DashboardState,
}

impl UiEnvelope {
    /// Wrap `data` in a `ui_update` envelope.
    pub fn update(data: DashboardState) -> Self {
        Self {
            kind: UI_UPDATE.to_string(),
            data,
        }
    }
}

/// Strip an optional `{"type": "ui_update", "data": {...}}` envelope.
///
/// An object without a `type` key is taken to be the data object itself.
/// Any other envelope type is reported as [`MalformedReason::UnexpectedEnvelope`],
/// carrying the envelope's `message` when the backend supplied one.
pub fn unwrap_envelope(value: &Value) -> Result<&Value, MalformedReason> {
    let Some(obj) = value.as_object() else {
        return Ok(value);
    };
    let Some(kind) = obj.get("type") else {
        return Ok(value);
    };

    match kind.as_str() {
        Some(UI_UPDATE) => obj.get("data").ok_or_else(|| MalformedReason::Schema {
            violations: vec![FieldViolation::missing("data")],
        }),
        Some(other) => Err(MalformedReason::UnexpectedEnvelope {
            kind: other.to_string(),
            message: obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        None => Err(MalformedReason::UnexpectedEnvelope {
            kind: kind.to_string(),
            message: None,
        }),
    }
}
