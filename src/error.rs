//! Error types for the httpd buildpack
//!
//! All modules use `BuildpackResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildpack operations
pub type BuildpackResult<T> = Result<T, BuildpackError>;

/// All errors that can occur during detect or build
#[derive(Error, Debug)]
pub enum BuildpackError {
    // Configuration errors
    #[error("failed to parse {name} value {value}: expected a boolean (true/false, 1/0, t/f)")]
    InvalidFlag { name: String, value: String },

    #[error("failed to parse {}: {reason}", path.display())]
    VersionFile { path: PathBuf, reason: String },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Dependency errors
    #[error("failed to satisfy \"{name}\" dependency version constraint \"{constraint}\" for stack \"{stack}\"")]
    DependencyNotFound {
        name: String,
        constraint: String,
        stack: String,
    },

    #[error("dependency resolution failed: {0}")]
    DependencyResolution(String),

    #[error("failed to download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("checksum does not match: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // Binding errors
    #[error("failed: binding resolver found more than one binding of type '{kind}'")]
    BindingConflict { kind: String },

    #[error("failed: binding of type '{kind}' does not contain required entry '{entry}'")]
    BindingIncomplete { kind: String, entry: String },

    #[error("failed to resolve bindings: {0}")]
    BindingResolution(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BuildpackError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid boolean flag error
    pub fn invalid_flag(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFlag {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFlag { .. } => Some("Boolean variables accept true/false, 1/0 or t/f"),
            Self::VersionFile { .. } => {
                Some("Set the version through $BP_HTTPD_VERSION instead of buildpack.yml")
            }
            Self::DependencyNotFound { .. } => {
                Some("Check $BP_HTTPD_VERSION against the versions listed in buildpack.toml")
            }
            Self::BindingConflict { .. } => Some("Provide at most one binding of type 'htpasswd'"),
            Self::BindingIncomplete { .. } => {
                Some("Add a '.htpasswd' entry to the htpasswd service binding")
            }
            _ => None,
        }
    }
}
