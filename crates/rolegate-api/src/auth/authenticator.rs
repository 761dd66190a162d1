// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request authentication pipeline.
//!
//! ```text
//! bearer ──► verify ──► resolve ──► get_or_create ──► load_roles ──► Principal
//! ```
//!
//! Each stage runs only after the previous one succeeded.

use std::sync::Arc;

use tracing::{debug, instrument};

use rolegate_core::{
    AuthFailure, CoreError, CoreResult, Principal, ProfileProvisioner, RoleResolver,
};

use super::{IdentityResolver, TokenVerifier};

/// Turns a bearer token into a [`Principal`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    verifier: Arc<TokenVerifier>,
    resolver: IdentityResolver,
    provisioner: ProfileProvisioner,
    roles: RoleResolver,
}

impl Authenticator {
    /// Creates an authenticator.
    pub fn new(
        verifier: Arc<TokenVerifier>,
        provisioner: ProfileProvisioner,
        roles: RoleResolver,
    ) -> Self {
        Self {
            verifier,
            resolver: IdentityResolver::new(),
            provisioner,
            roles,
        }
    }

    /// Returns the token verifier.
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticates the value of an `Authorization` header.
    pub async fn authenticate_header(&self, header: Option<&str>) -> CoreResult<Principal> {
        let token = header
            .and_then(bearer_token)
            .ok_or_else(|| CoreError::unauthenticated(AuthFailure::MissingCredentials))?;
        self.authenticate(token).await
    }

    /// Authenticates a raw bearer token.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> CoreResult<Principal> {
        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            CoreError::from(e)
        })?;

        let identity = self.resolver.resolve(&claims)?;
        let provisioned = self.provisioner.get_or_create(&identity).await?;
        let roles = self.roles.load_roles(&provisioned.profile.id).await?;

        debug!(
            profile_id = %provisioned.profile.id,
            created = provisioned.created,
            roles = ?roles.names(),
            "Authenticated"
        );

        Ok(Principal::new(provisioned.profile, roles).with_role_hint(identity.role_hint))
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use rolegate_config::JwtAlgorithm;
    use rolegate_core::{ProfileStore, RoleCatalog, RoleDefinition, RoleName};
    use rolegate_store::MemoryStore;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    async fn setup() -> (Authenticator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for def in RoleDefinition::defaults() {
            store
                .insert_role(rolegate_core::Role::new(def.name, def.description))
                .await
                .unwrap();
        }
        let verifier = Arc::new(TokenVerifier::new(SECRET, JwtAlgorithm::HS256).unwrap());
        let provisioner = ProfileProvisioner::new(store.clone(), store.clone())
            .with_baseline_role(Some(RoleName::user()));
        let auth = Authenticator::new(verifier, provisioner, RoleResolver::new(store.clone()));
        (auth, store)
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[tokio::test]
    async fn test_first_contact_provisions() {
        let (auth, store) = setup().await;
        let token = auth
            .verifier()
            .sign(&Claims::new("u1", 3600).with_email("u1@x").with_role_hint("admin"))
            .unwrap();

        let principal = auth.authenticate(&token).await.unwrap();

        assert_eq!(principal.id().as_str(), "u1");
        assert!(principal.profile.is_active);
        assert!(principal.has_role("user"));
        // The hint never grants roles.
        assert!(!principal.is_admin());
        assert_eq!(principal.role_hint, "admin");
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (auth, _) = setup().await;
        let err = auth.authenticate_header(None).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Unauthenticated {
                reason: AuthFailure::MissingCredentials
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_token_never_provisions() {
        let (auth, store) = setup().await;
        let err = auth
            .authenticate_header(Some("Bearer not-a-token"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_subject_never_provisions() {
        let (auth, store) = setup().await;
        let token = auth
            .verifier()
            .sign(&Claims::new("u1", 3600).without_subject())
            .unwrap();

        let err = auth.authenticate(&token).await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(store.get_profile(&"u1".into()).await.unwrap().is_none());
    }
}
