// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Claims to identity mapping.

use rolegate_core::{AuthFailure, CoreError, CoreResult, Identity, USER_ROLE};

use super::Claims;

/// Maps verified claims to an [`Identity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IdentityResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolves the caller's identity.
    ///
    /// The subject is opaque and kept byte for byte; a blank one is
    /// rejected. A missing email becomes an empty string and a missing role
    /// hint defaults to `user`.
    pub fn resolve(&self, claims: &Claims) -> CoreResult<Identity> {
        let subject = claims
            .sub
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::unauthenticated(AuthFailure::MissingSubject))?;

        let email = claims.email.as_deref().map(str::trim).unwrap_or_default();
        let hint = claims
            .user_metadata
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(USER_ROLE);

        Ok(Identity::new(subject, email).with_role_hint(hint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_claims() {
        let claims = Claims::new("u1", 60)
            .with_email("u1@x")
            .with_role_hint("moderator");
        let identity = IdentityResolver::new().resolve(&claims).unwrap();

        assert_eq!(identity.id.as_str(), "u1");
        assert_eq!(identity.email, "u1@x");
        assert_eq!(identity.role_hint, "moderator");
    }

    #[test]
    fn test_defaults() {
        let identity = IdentityResolver::new()
            .resolve(&Claims::new("u2", 60))
            .unwrap();
        assert_eq!(identity.email, "");
        assert_eq!(identity.role_hint, USER_ROLE);
    }

    #[test]
    fn test_missing_subject() {
        let resolver = IdentityResolver::new();

        let err = resolver
            .resolve(&Claims::new("u1", 60).without_subject())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Unauthenticated {
                reason: AuthFailure::MissingSubject
            }
        ));

        let err = resolver.resolve(&Claims::new("   ", 60)).unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_subject_is_not_normalized() {
        let resolver = IdentityResolver::new();
        let plain = resolver.resolve(&Claims::new("u1", 60)).unwrap();
        let padded = resolver.resolve(&Claims::new(" u1 ", 60)).unwrap();

        assert_eq!(padded.id.as_str(), " u1 ");
        assert_ne!(plain.id, padded.id);
    }
}
