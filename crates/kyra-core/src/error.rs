//! Error types for the renderer boundary
//!
//! Malformed markup is never an error; it degrades to literal text inside the
//! renderer. These types only cover call shapes the renderer refuses and
//! configuration problems.

use std::path::PathBuf;

/// A render call that was handed something it cannot render
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A payload field had the wrong type or was missing
    #[error("invalid input for `{field}`: expected {expected}, found {found}")]
    InvalidInput {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The payload was not JSON at all
    #[error("failed to decode message payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RenderError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            expected,
            found: json_kind(found),
        }
    }
}

/// Failure to load a render configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
