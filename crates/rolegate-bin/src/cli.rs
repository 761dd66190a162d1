// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the service (default)
//! - `validate`: Validate a configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// rolegate - identity and role-based access control service
#[derive(Parser, Debug)]
#[command(
    name = "rolegate",
    author = "Sylvex <contact@sylvex.io>",
    version = rolegate_core::VERSION,
    about = "Bearer-token identity, lazy profile provisioning and role-based access control",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "rolegate.yaml",
        env = "ROLEGATE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format override (text, json, compact)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the service
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without opening the store.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Start from defaults and environment when the config file is missing
    #[arg(long, env = "ROLEGATE_ALLOW_MISSING_CONFIG")]
    pub allow_missing_config: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secret masked)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<rolegate_config::LogFormat> for LogFormat {
    fn from(format: rolegate_config::LogFormat) -> Self {
        match format {
            rolegate_config::LogFormat::Text => LogFormat::Text,
            rolegate_config::LogFormat::Json => LogFormat::Json,
            rolegate_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parses CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the command to run, defaulting to `Run`.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Returns the log level, preferring flags over `configured`.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// Returns the log format, preferring the flag over `configured`.
    pub fn effective_log_format(&self, configured: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(configured)
    }
}

// =============================================================================
// Tests
// =============================================================================
