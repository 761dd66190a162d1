// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate Integration Tests
//!
//! Shared fixtures, mocks and a test harness for exercising rolegate end
//! to end.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Identities, principals, signed tokens and configs
//!   - `mocks`: Store wrappers with failure injection
//!   - `harness`: An in-process router with request helpers
//!   - `assertions`: Error-shape and role-set assertions
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rolegate-tests
//! cargo test -p rolegate-tests --test integration_core
//! cargo test -p rolegate-tests --test integration_api
//! cargo test -p rolegate-tests --test integration_store
//! cargo test -p rolegate-tests --test integration_config
//! ```
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use rolegate_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new().await;
//!     let token = app.token_for("u1");
//!     let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
