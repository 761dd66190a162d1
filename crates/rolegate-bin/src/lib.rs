// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate-bin
//!
//! The `rolegate` service binary: CLI parsing, logging setup, startup
//! wiring and graceful shutdown.
//!
//! ## Startup
//!
//! ```text
//! config file / env ──▶ RolegateConfig
//!                           │
//!                           ├──▶ store (memory | sqlite)
//!                           │       ├── seed roles
//!                           │       └── grant bootstrap admins
//!                           │
//!                           └──▶ TokenVerifier ──▶ AppState ──▶ ApiServer
//!                                                                 │
//!                                   SIGTERM / SIGINT ──▶ drain ◀──┘
//! ```
//!
//! ## Usage
//!
//! ```text
//! rolegate                      # run with ./rolegate.yaml
//! rolegate -c /etc/rolegate.yaml run
//! rolegate validate --show-config
//! rolegate version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name.
pub const NAME: &str = "rolegate";
