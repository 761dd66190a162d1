// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::{info, warn};

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Loads configuration, installs logging and serves until shutdown.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .allow_missing_config(args.allow_missing_config)
        .build()?;

    let logging = &runtime.config().logging;
    init_logging(
        cli.effective_log_level(logging.level.as_str()),
        cli.effective_log_format(logging.format.into()),
    )?;

    info!(config = %cli.config.display(), "Configuration loaded");
    for warning in runtime.config().warnings() {
        warn!("{}", warning);
    }

    runtime.run().await
}
