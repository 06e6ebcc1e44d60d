// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for genui clients.
//!
//! This crate provides [`GenUiConfig`] (backend location, endpoint paths,
//! decoder limits, logging) together with helpers for loading from TOML
//! files, applying `GENUI_*` environment overrides, merging overlays, and
//! producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use genui_error::{ErrorCode, GenUiError};
use genui_wire::{DEFAULT_MAX_LINE_BYTES, DecodeOptions, TrailingLinePolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file or an override could not be parsed.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

impl From<ConfigError> for GenUiError {
    fn from(err: ConfigError) -> Self {
        let reasons = match &err {
            ConfigError::ValidationError { reasons } => reasons.clone(),
            _ => Vec::new(),
        };
        let mut out = GenUiError::new(ErrorCode::ConfigInvalid, err.to_string());
        if !reasons.is_empty() {
            out = out.with_context("reasons", reasons);
        }
        out.with_source(err)
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The stream timeout is unusually large.
    LargeTimeout {
        /// Timeout value in seconds.
        secs: u64,
    },
    /// The line limit is small enough to reject ordinary payloads.
    SmallLineLimit {
        /// Configured limit in bytes.
        bytes: usize,
    },
    /// Plain HTTP to a host other than the local machine.
    InsecureBackend {
        /// The configured backend URL.
        url: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeTimeout { secs } => {
                write!(f, "stream timeout is large ({secs}s)")
            }
            ConfigWarning::SmallLineLimit { bytes } => {
                write!(f, "max_line_bytes is very small ({bytes} bytes)")
            }
            ConfigWarning::InsecureBackend { url } => {
                write!(f, "backend '{url}' uses plain http to a remote host")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GenUiConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Longest accepted data line in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_bytes: Option<usize>,

    /// Handling of an unterminated line when a stream ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_line: Option<TrailingLinePolicy>,

    /// Cancel streams that run longer than this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_timeout_secs: Option<u64>,

    /// Endpoint paths relative to `backend_url`.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl Default for GenUiConfig {
    fn default() -> Self {
        Self {
            backend_url: Some(DEFAULT_BACKEND_URL.into()),
            log_level: Some("info".into()),
            max_line_bytes: None,
            trailing_line: None,
            stream_timeout_secs: None,
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl GenUiConfig {
    /// Effective backend URL.
    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Decoder options derived from this configuration.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_line_bytes: self.max_line_bytes.unwrap_or(DEFAULT_MAX_LINE_BYTES),
            trailing_line: self.trailing_line.unwrap_or_default(),
        }
    }

    /// Stream timeout, if configured.
    pub fn stream_timeout(&self) -> Option<Duration> {
        self.stream_timeout_secs.map(Duration::from_secs)
    }
}

/// Paths of the three backend endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct EndpointsConfig {
    /// Non-streaming exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<String>,
    /// Streaming text exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    /// Structured dashboard document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<String>,
}

impl EndpointsConfig {
    /// Effective path of the non-streaming exchange.
    pub fn basic(&self) -> &str {
        self.basic.as_deref().unwrap_or(DEFAULT_BASIC_PATH)
    }

    /// Effective path of the streaming exchange.
    pub fn stream(&self) -> &str {
        self.stream.as_deref().unwrap_or(DEFAULT_STREAM_PATH)
    }

    /// Effective path of the structured document.
    pub fn ui(&self) -> &str {
        self.ui.as_deref().unwrap_or(DEFAULT_UI_PATH)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Backend used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default path of the non-streaming exchange.
pub const DEFAULT_BASIC_PATH: &str = "/api/level1/basic";

/// Default path of the streaming exchange.
pub const DEFAULT_STREAM_PATH: &str = "/api/level2/stream";

/// Default path of the structured document.
pub const DEFAULT_UI_PATH: &str = "/api/level3/ui";

/// Maximum allowed timeout in seconds (24 hours).
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Threshold above which a timeout generates a warning.
const LARGE_TIMEOUT_THRESHOLD: u64 = 3_600;

/// Line limits below this generate a warning.
const SMALL_LINE_LIMIT: usize = 1024;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`GenUiConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`GenUiConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<GenUiConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => GenUiConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`GenUiConfig`].
pub fn parse_toml(content: &str) -> Result<GenUiConfig, ConfigError> {
    toml::from_str::<GenUiConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `GENUI_BACKEND_URL`
/// - `GENUI_LOG_LEVEL`
/// - `GENUI_MAX_LINE_BYTES`
/// - `GENUI_TRAILING_LINE`
/// - `GENUI_STREAM_TIMEOUT_SECS`
pub fn apply_env_overrides(config: &mut GenUiConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides looked up through `lookup` instead of the process environment.
pub fn apply_overrides<F>(config: &mut GenUiConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("GENUI_BACKEND_URL") {
        config.backend_url = Some(val);
    }
    if let Some(val) = lookup("GENUI_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Some(val) = lookup("GENUI_MAX_LINE_BYTES") {
        config.max_line_bytes = Some(parse_var("GENUI_MAX_LINE_BYTES", &val)?);
    }
    if let Some(val) = lookup("GENUI_TRAILING_LINE") {
        config.trailing_line = Some(parse_var("GENUI_TRAILING_LINE", &val)?);
    }
    if let Some(val) = lookup("GENUI_STREAM_TIMEOUT_SECS") {
        config.stream_timeout_secs = Some(parse_var("GENUI_STREAM_TIMEOUT_SECS", &val)?);
    }
    Ok(())
}

fn parse_var<T>(key: &str, val: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e| ConfigError::ParseError {
        reason: format!("{key}={val:?}: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (bad URL, out-of-range limits, relative endpoint paths) are
/// returned as a [`ConfigError::ValidationError`]; soft issues come back as
/// warnings.
pub fn validate_config(config: &GenUiConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    let url = config.backend_url();
    match Url::parse(url) {
        Err(e) => errors.push(format!("backend_url '{url}' is not a valid URL: {e}")),
        Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => errors.push(format!(
            "backend_url '{url}' must start with http:// or https://"
        )),
        Ok(parsed) => match parsed.host_str() {
            None | Some("") => errors.push(format!("backend_url '{url}' has no host")),
            Some(host) if parsed.scheme() == "http" && !is_local_host(host) => {
                warnings.push(ConfigWarning::InsecureBackend {
                    url: url.to_string(),
                });
            }
            Some(_) => {}
        },
    }

    if let Some(bytes) = config.max_line_bytes {
        if bytes == 0 {
            errors.push("max_line_bytes must be greater than zero".into());
        } else if bytes < SMALL_LINE_LIMIT {
            warnings.push(ConfigWarning::SmallLineLimit { bytes });
        }
    }

    match config.stream_timeout_secs {
        Some(t) if t == 0 || t > MAX_TIMEOUT_SECS => errors.push(format!(
            "stream timeout {t}s out of range (1..{MAX_TIMEOUT_SECS})"
        )),
        Some(t) if t > LARGE_TIMEOUT_THRESHOLD => {
            warnings.push(ConfigWarning::LargeTimeout { secs: t });
        }
        Some(_) => {}
        None => warnings.push(ConfigWarning::MissingOptionalField {
            field: "stream_timeout_secs".into(),
            hint: "streams run until they finish or are cancelled".into(),
        }),
    }

    for (name, path) in [
        ("basic", config.endpoints.basic()),
        ("stream", config.endpoints.stream()),
        ("ui", config.endpoints.ui()),
    ] {
        if !path.starts_with('/') {
            errors.push(format!("endpoint '{name}' path '{path}' must start with '/'"));
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "[::1]")
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
pub fn merge_configs(base: GenUiConfig, overlay: GenUiConfig) -> GenUiConfig {
    GenUiConfig {
        backend_url: overlay.backend_url.or(base.backend_url),
        log_level: overlay.log_level.or(base.log_level),
        max_line_bytes: overlay.max_line_bytes.or(base.max_line_bytes),
        trailing_line: overlay.trailing_line.or(base.trailing_line),
        stream_timeout_secs: overlay.stream_timeout_secs.or(base.stream_timeout_secs),
        endpoints: EndpointsConfig {
            basic: overlay.endpoints.basic.or(base.endpoints.basic),
            stream: overlay.endpoints.stream.or(base.endpoints.stream),
            ui: overlay.endpoints.ui.or(base.endpoints.ui),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
