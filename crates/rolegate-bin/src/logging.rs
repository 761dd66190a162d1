// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Noisy dependencies capped below the service level.
const DEPENDENCY_DIRECTIVES: &[&str] = &["hyper=warn", "tower=warn", "sqlx=warn", "axum=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is an error.
///
/// ```ignore
/// use rolegate_bin::{cli::LogFormat, logging::init_logging};
///
/// init_logging("info", LogFormat::Json)?;
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level)?;

    let result = match format {
        LogFormat::Text => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(is_terminal),
                )
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).with_ansi(false))
            .try_init(),
    };

    result.map_err(|e| BinError::init(format!("Failed to install logger: {}", e)))
}

/// Builds the filter from `RUST_LOG` or `level`, plus dependency caps.
pub fn build_filter(level: &str) -> BinResult<EnvFilter> {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| BinError::config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    for directive in DEPENDENCY_DIRECTIVES {
        let directive: Directive = directive
            .parse()
            .map_err(|e| BinError::config(format!("Invalid log directive '{}': {}", directive, e)))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

// =============================================================================
// Tests
// =============================================================================
