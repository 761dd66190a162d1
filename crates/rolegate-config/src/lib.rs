// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate-config
//!
//! Configuration management for the rolegate access-control service.
//!
//! ## Features
//!
//! - **Schema Definition**: Typed sections with per-section validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `ROLEGATE_*` variables and `${VAR:default}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use rolegate_config::loader::load_config;
//!
//! let config = load_config("rolegate.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - Listener, CORS and timeouts
//! - `auth` - Token signing secret, algorithm and public paths
//! - `store` - Profile and role backend
//! - `rbac` - Baseline role, seeded roles and bootstrap administrators
//! - `logging` - Log level and output format

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    AuthConfig, CorsConfig, JwtAlgorithm, LogFormat, LogLevel, LoggingConfig, RbacConfig,
    RoleSeed, RolegateConfig, SecretValue, ServerConfig, StoreBackend, StoreConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
