// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod run;
mod validate;
mod version;

pub use run::run;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands, LogFormat};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the command selected on the command line.
///
/// `run` installs logging itself once configuration is loaded; the other
/// commands log with flag values or defaults.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => {
            init_logging(
                cli.effective_log_level("warn"),
                cli.effective_log_format(LogFormat::Text),
            )?;
            validate::validate(&cli, args)
        }
        Commands::Version => version::version(&cli),
    }
}
