// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate-store
//!
//! Backends implementing the [`ProfileStore`](rolegate_core::ProfileStore)
//! and [`RoleCatalog`](rolegate_core::RoleCatalog) contracts.
//!
//! - [`MemoryStore`]: `parking_lot`-guarded maps, for tests and development
//! - [`SqliteStore`]: `sqlx` over SQLite, for single-node deployments

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
