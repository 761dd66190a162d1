// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate-api
//!
//! HTTP adapter for rolegate.
//!
//! Verifies bearer tokens, provisions profiles on first contact, loads roles
//! per request and enforces guard chains in front of the profile and role
//! endpoints.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{Authenticator, Claims, IdentityResolver, TokenError, TokenVerifier};
pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
