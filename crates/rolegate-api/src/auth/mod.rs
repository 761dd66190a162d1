// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Bearer token verification
//! - Claims to identity mapping
//! - The per-request authentication pipeline

mod authenticator;
mod claims;
mod identity;
mod token;

pub use authenticator::{bearer_token, Authenticator};
pub use claims::{Claims, UserMetadata};
pub use identity::IdentityResolver;
pub use token::{TokenError, TokenVerifier};
