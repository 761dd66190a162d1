// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading or validating a [`RolegateConfig`].
//!
//! [`RolegateConfig`]: crate::RolegateConfig

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
///
/// Field names use dotted paths (`auth.jwt_secret`, `rbac.roles[0].name`)
/// so operators can find the offending key directly.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be parsed in its declared format.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Config file.
        path: PathBuf,
        /// Parser output.
        message: String,
    },

    /// A value was present but rejected.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// Dotted field path.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// A required value is absent.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Dotted field path.
        field: String,
    },

    /// The file exists but could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No file at the given path.
    #[error("Config file not found: {path}")]
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A `ROLEGATE_*` override could not be parsed.
    #[error("Invalid value in environment variable '{name}': {message}")]
    InvalidEnvVar {
        /// Full variable name, prefix included.
        name: String,
        /// Expected shape.
        message: String,
    },

    /// The file extension maps to no known format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The extension found.
        format: String,
    },

    /// Deserialization failed on an in-memory document.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Deserializer output.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error for a file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Wraps a read failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an error for an unparsable override.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns the dotted field path, when the error concerns one field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::MissingField { field } => Some(field),
            _ => None,
        }
    }

    /// Returns `true` if the error concerns the signing secret.
    ///
    /// A missing or empty secret is fatal at startup.
    pub fn is_secret_error(&self) -> bool {
        self.field() == Some("auth.jwt_secret")
    }

    /// Returns a stable identifier for logs and JSON output.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::MissingField { .. } => "missing_field",
            Self::Io { .. } => "io",
            Self::FileNotFound { .. } => "file_not_found",
            Self::InvalidEnvVar { .. } => "invalid_env_var",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Serialization { .. } => "serialization",
        }
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Tests
// =============================================================================
