// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! rolegate service entry point.

use rolegate_bin::{cli::Cli, commands, error::report_error_and_exit};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
