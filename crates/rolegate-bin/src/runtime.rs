// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Loads configuration, opens the store, seeds roles, grants bootstrap
//! admins, then serves HTTP until a shutdown signal drains it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use rolegate_api::{ApiServer, AppState, TokenVerifier};
use rolegate_config::{ConfigError, ConfigLoader, RolegateConfig, StoreBackend};
use rolegate_core::{ProfileStore, RoleAdministration, RoleCatalog, RoleName};
use rolegate_store::{MemoryStore, SqliteStore};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The service runtime.
#[derive(Debug)]
pub struct ServiceRuntime {
    config: Arc<RolegateConfig>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a runtime from a validated configuration.
    pub fn new(config: RolegateConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &RolegateConfig {
        &self.config
    }

    /// Returns a handle that can trigger shutdown.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn run(self) -> BinResult<()> {
        let addr = self.config.server.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BinError::init(format!("Failed to bind {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener until shutdown.
    pub async fn serve(self, listener: TcpListener) -> BinResult<()> {
        info!("Starting rolegate v{}", crate::VERSION);

        let state = self.initialize().await?;
        let server = ApiServer::new(state);
        let mut server_task = tokio::spawn(server.serve(listener, self.shutdown.shutdown_signal()));

        info!(
            backend = %self.config.store.backend,
            base_path = %self.config.server.base_path,
            "rolegate is ready"
        );

        tokio::select! {
            joined = &mut server_task => {
                // The server only returns on its own when it failed.
                self.shutdown.initiate_shutdown();
                return match joined {
                    Ok(result) => result.map_err(BinError::from),
                    Err(e) => Err(BinError::runtime(format!("Server task failed: {}", e))),
                };
            }
            _ = self.shutdown.wait_for_shutdown() => {}
        }

        info!("Shutdown initiated, draining in-flight requests...");
        let drain = self.config.server.shutdown_timeout;
        match tokio::time::timeout(drain, server_task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(BinError::runtime(format!("Server task failed: {}", e))),
            Err(_) => warn!(timeout = ?drain, "Drain timed out; abandoning open requests"),
        }

        info!("rolegate shutdown complete");
        Ok(())
    }

    /// Opens the store, seeds roles and builds the application state.
    pub async fn initialize(&self) -> BinResult<AppState> {
        let (profiles, catalog) = open_store(&self.config).await?;

        profiles
            .ping()
            .await
            .map_err(|e| BinError::init(format!("Store '{}' is not reachable: {}", profiles.name(), e)))?;
        catalog
            .ping()
            .await
            .map_err(|e| BinError::init(format!("Role catalog is not reachable: {}", e)))?;

        let admin = RoleAdministration::new(profiles.clone(), catalog.clone());
        let definitions = self.config.rbac.role_definitions()?;
        admin.ensure_roles(&definitions).await?;

        let bootstrap = self.config.rbac.bootstrap_admin_ids();
        for id in &bootstrap {
            if admin.grant_system(id, &RoleName::admin()).await? {
                info!(profile_id = %id, "Granted admin to bootstrap profile");
            }
        }

        let verifier = TokenVerifier::from_config(&self.config.auth)?;

        let state = AppState::builder()
            .config(self.config.server.clone())
            .public_paths(self.config.auth.public_paths.clone())
            .verifier(Arc::new(verifier))
            .profiles(profiles)
            .catalog(catalog)
            .baseline_role(self.config.rbac.baseline_role()?)
            .bootstrap_admins(bootstrap)
            .build()?;

        Ok(state)
    }
}

/// Opens the configured backend as both store contracts.
async fn open_store(
    config: &RolegateConfig,
) -> BinResult<(Arc<dyn ProfileStore>, Arc<dyn RoleCatalog>)> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store: profiles and roles are lost on restart");
            let store = Arc::new(MemoryStore::new());
            Ok((store.clone(), store))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.store.path, config.store.max_connections)
                .await
                .map_err(|e| {
                    BinError::init(format!(
                        "Failed to open {}: {}",
                        config.store.path.display(),
                        e
                    ))
                })?;
            let store = Arc::new(store);
            Ok((store.clone(), store))
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<RolegateConfig>,
    allow_missing_config: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: RolegateConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Falls back to defaults plus environment when the file is missing.
    pub fn allow_missing_config(mut self, allow: bool) -> Self {
        self.allow_missing_config = allow;
        self
    }

    /// Builds the runtime, loading configuration if none was given.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                let loader = ConfigLoader::new();

                match loader.load(&path) {
                    Ok(config) => config,
                    Err(ConfigError::FileNotFound { .. }) if self.allow_missing_config => {
                        info!(
                            "No configuration at {}; using defaults and environment",
                            path.display()
                        );
                        loader.load_from_env()?
                    }
                    Err(e) => {
                        return Err(BinError::from(e)
                            .with_context(format!("Failed to load {}", path.display())))
                    }
                }
            }
        };

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
