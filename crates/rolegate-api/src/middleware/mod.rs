// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthMiddleware`]: bearer authentication, attaches the `Principal`
//! - [`GuardMiddleware`]: per-route guard chains

mod auth;
mod guard;

pub use auth::{AuthLayer, AuthMiddleware};
pub use guard::{GuardLayer, GuardMiddleware};
