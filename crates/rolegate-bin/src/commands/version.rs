// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints component versions and build information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("rolegate - identity and role-based access control");
    println!();
    println!("Version Information:");
    println!("  rolegate-bin:    {}", crate::VERSION);
    println!("  rolegate-core:   {}", rolegate_core::VERSION);
    println!("  rolegate-api:    {}", rolegate_api::VERSION);
    println!("  rolegate-config: {}", rolegate_config::VERSION);
    println!("  rolegate-store:  {}", rolegate_store::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
