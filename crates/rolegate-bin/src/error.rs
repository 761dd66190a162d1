// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the rolegate binary.

use thiserror::Error;

/// Result type alias for rolegate-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the rolegate binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initialization error.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] rolegate_api::ApiError),

    /// Config parsing error.
    #[error("Config error: {0}")]
    Config(#[from] rolegate_config::ConfigError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] rolegate_core::CoreError),

    /// Token verifier setup error.
    #[error("Token error: {0}")]
    Token(#[from] rolegate_api::TokenError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) | Self::Token(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Api(_) => 6,
            Self::Core(_) => 7,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<rolegate_core::StoreError> for BinError {
    fn from(err: rolegate_core::StoreError) -> Self {
        Self::Core(err.into())
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
