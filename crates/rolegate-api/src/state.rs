// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use rolegate_config::ServerConfig;
use rolegate_core::{
    ProfileDirectory, ProfileId, ProfileProvisioner, ProfileStore, RoleAdministration,
    RoleCatalog, RoleName, RoleResolver,
};

use crate::auth::{Authenticator, TokenVerifier};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Paths served without authentication.
    pub public_paths: Arc<Vec<String>>,
    /// Authentication pipeline.
    pub authenticator: Arc<Authenticator>,
    /// Profile reads and self-service updates.
    pub directory: Arc<ProfileDirectory>,
    /// Role and membership administration.
    pub admin: Arc<RoleAdministration>,
    /// Profile store, for readiness checks.
    pub profiles: Arc<dyn ProfileStore>,
    /// Role catalog, for readiness checks.
    pub catalog: Arc<dyn RoleCatalog>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token verifier.
    pub fn verifier(&self) -> &TokenVerifier {
        self.authenticator.verifier()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("profiles", &self.profiles.name())
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ServerConfig>,
    public_paths: Option<Vec<String>>,
    verifier: Option<Arc<TokenVerifier>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    catalog: Option<Arc<dyn RoleCatalog>>,
    baseline_role: Option<RoleName>,
    bootstrap_admins: Vec<ProfileId>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the public paths.
    pub fn public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Some(paths);
        self
    }

    /// Sets the token verifier.
    pub fn verifier(mut self, verifier: Arc<TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Sets the profile store.
    pub fn profiles(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    /// Sets the role catalog.
    pub fn catalog(mut self, catalog: Arc<dyn RoleCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the role attached to newly provisioned profiles.
    pub fn baseline_role(mut self, role: Option<RoleName>) -> Self {
        self.baseline_role = role;
        self
    }

    /// Sets profile ids granted `admin` on first contact.
    pub fn bootstrap_admins(mut self, ids: Vec<ProfileId>) -> Self {
        self.bootstrap_admins = ids;
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the verifier or either store is missing.
    pub fn build(self) -> ApiResult<AppState> {
        let verifier = self
            .verifier
            .ok_or_else(|| ApiError::internal("token verifier is not configured"))?;
        let profiles = self
            .profiles
            .ok_or_else(|| ApiError::internal("profile store is not configured"))?;
        let catalog = self
            .catalog
            .ok_or_else(|| ApiError::internal("role catalog is not configured"))?;

        let provisioner = ProfileProvisioner::new(profiles.clone(), catalog.clone())
            .with_baseline_role(self.baseline_role)
            .with_bootstrap_admins(self.bootstrap_admins);
        let authenticator =
            Authenticator::new(verifier, provisioner, RoleResolver::new(catalog.clone()));

        Ok(AppState {
            config: Arc::new(self.config.unwrap_or_default()),
            public_paths: Arc::new(
                self.public_paths
                    .unwrap_or_else(|| vec!["/health".to_string(), "/ready".to_string()]),
            ),
            authenticator: Arc::new(authenticator),
            directory: Arc::new(ProfileDirectory::new(profiles.clone())),
            admin: Arc::new(RoleAdministration::new(profiles.clone(), catalog.clone())),
            profiles,
            catalog,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_config::JwtAlgorithm;
    use rolegate_store::MemoryStore;

    #[test]
    fn test_app_state_builder() {
        let store = Arc::new(MemoryStore::new());
        let verifier = Arc::new(
            TokenVerifier::new("test-secret-key-that-is-long-enough", JwtAlgorithm::HS256)
                .unwrap(),
        );

        let state = AppState::builder()
            .verifier(verifier)
            .profiles(store.clone())
            .catalog(store)
            .build()
            .unwrap();

        assert_eq!(state.config.port, 8080);
        assert_eq!(state.public_paths.len(), 2);
    }

    #[test]
    fn test_builder_requires_stores() {
        let verifier = Arc::new(
            TokenVerifier::new("test-secret-key-that-is-long-enough", JwtAlgorithm::HS256)
                .unwrap(),
        );
        assert!(AppState::builder().verifier(verifier).build().is_err());
        assert!(AppState::builder().build().is_err());
    }
}
