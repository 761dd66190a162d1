// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness and readiness
//! - [`users`]: current profile, profile directory and memberships
//! - [`roles`]: role catalog administration

mod health;
mod roles;
mod users;

pub use health::*;
pub use roles::*;
pub use users::*;
