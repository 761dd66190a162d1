// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Composable authorization guards.
//!
//! A [`GuardChain`] is an ordered list of pure predicates over the caller.
//! Evaluation stops at the first failure, so an [`Guard::Authenticated`]
//! placed first guarantees role guards only ever see an authenticated
//! principal.
//!
//! ```
//! use rolegate_core::guard::{GuardChain, RoleGuard};
//!
//! let chain = GuardChain::authenticated()
//!     .require_active()
//!     .require(RoleGuard::any(["admin", "moderator"]));
//!
//! // No principal: rejected as unauthenticated before any role check.
//! let err = chain.evaluate::<rolegate_core::types::Principal>(None).unwrap_err();
//! assert_eq!(err.status_code(), 401);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthFailure, CoreError, CoreResult};
use crate::types::{RoleSet, ADMIN_ROLE};

// =============================================================================
// GuardMode
// =============================================================================

/// How a set of required roles is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// At least one required role must be held.
    Any,
    /// Every required role must be held.
    All,
}

impl fmt::Display for GuardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardMode::Any => write!(f, "any"),
            GuardMode::All => write!(f, "all"),
        }
    }
}

// =============================================================================
// RoleGuard
// =============================================================================

/// A role requirement.
///
/// An empty requirement never passes in [`GuardMode::Any`] and always passes
/// in [`GuardMode::All`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    required: Vec<String>,
    mode: GuardMode,
    denial: String,
}

impl RoleGuard {
    /// Passes if any of the roles is held.
    pub fn any<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required: Vec<String> = roles.into_iter().map(Into::into).collect();
        let denial = format!("Requires one of these roles: {}", required.join(", "));
        Self {
            required,
            mode: GuardMode::Any,
            denial,
        }
    }

    /// Passes only if every role is held.
    pub fn all<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required: Vec<String> = roles.into_iter().map(Into::into).collect();
        let denial = format!("Requires all of these roles: {}", required.join(", "));
        Self {
            required,
            mode: GuardMode::All,
            denial,
        }
    }

    /// Passes if the single role is held.
    pub fn role(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            denial: format!("Role '{}' required", name),
            required: vec![name],
            mode: GuardMode::Any,
        }
    }

    /// Passes for administrators.
    pub fn admin() -> Self {
        Self {
            required: vec![ADMIN_ROLE.to_string()],
            mode: GuardMode::Any,
            denial: "Admin access required".to_string(),
        }
    }

    /// Required role names.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Matching mode.
    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Returns `true` if `roles` satisfies this requirement.
    pub fn check(&self, roles: &RoleSet) -> bool {
        match self.mode {
            GuardMode::Any => self.required.iter().any(|r| roles.contains(r)),
            GuardMode::All => self.required.iter().all(|r| roles.contains(r)),
        }
    }

    /// Checks `roles`, returning `Forbidden` on failure.
    pub fn authorize(&self, roles: &RoleSet) -> CoreResult<()> {
        if self.check(roles) {
            Ok(())
        } else {
            Err(CoreError::forbidden(self.required.clone(), self.denial.clone()))
        }
    }
}

// =============================================================================
// Guard
// =============================================================================

/// A single link in a [`GuardChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The caller must be authenticated.
    Authenticated,
    /// The caller's profile must be active.
    Active,
    /// The caller must satisfy a role requirement.
    Roles(RoleGuard),
}

impl Guard {
    /// Evaluates this guard against an optional principal.
    ///
    /// Every guard rejects a missing principal as unauthenticated.
    pub fn evaluate<'a, P>(&self, principal: Option<&'a P>) -> CoreResult<&'a P>
    where
        P: Guarded,
    {
        let principal = principal
            .ok_or_else(|| CoreError::unauthenticated(AuthFailure::MissingCredentials))?;

        match self {
            Guard::Authenticated => {}
            Guard::Active => {
                if !principal.is_active() {
                    return Err(CoreError::forbidden(Vec::new(), "Inactive profile"));
                }
            }
            Guard::Roles(guard) => guard.authorize(principal.roles())?,
        }
        Ok(principal)
    }
}

/// Anything a guard can inspect.
///
/// Implemented for [`Principal`](crate::types::Principal); HTTP layers may
/// implement it for their request context.
pub trait Guarded {
    /// Roles held for this request.
    fn roles(&self) -> &RoleSet;

    /// Whether the underlying profile is active.
    fn is_active(&self) -> bool;
}

impl Guarded for crate::types::Principal {
    fn roles(&self) -> &RoleSet {
        &self.roles
    }

    fn is_active(&self) -> bool {
        self.profile.is_active
    }
}

// =============================================================================
// GuardChain
// =============================================================================

/// Ordered guard composition; the first failing guard wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain that starts with [`Guard::Authenticated`].
    pub fn authenticated() -> Self {
        Self::new().then(Guard::Authenticated)
    }

    /// Creates an authenticated chain that requires the admin role.
    pub fn admin() -> Self {
        Self::authenticated().require(RoleGuard::admin())
    }

    /// Appends a guard.
    pub fn then(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Appends an active-profile guard.
    pub fn require_active(self) -> Self {
        self.then(Guard::Active)
    }

    /// Appends a role guard.
    pub fn require(self, guard: RoleGuard) -> Self {
        self.then(Guard::Roles(guard))
    }

    /// Guards in evaluation order.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Evaluates every guard in order.
    ///
    /// An empty chain still requires a principal.
    pub fn evaluate<'a, P>(&self, principal: Option<&'a P>) -> CoreResult<&'a P>
    where
        P: Guarded,
    {
        if self.guards.is_empty() {
            return Guard::Authenticated.evaluate(principal);
        }
        let mut current = principal;
        for guard in &self.guards {
            current = Some(guard.evaluate(current)?);
        }
        current.ok_or_else(|| CoreError::unauthenticated(AuthFailure::MissingCredentials))
    }
}

// =============================================================================
// Tests
// =============================================================================
