// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for rolegate.
//!
//! # Schema Structure
//!
//! ```text
//! RolegateConfig
//! ├── server: ServerConfig
//! ├── auth: AuthConfig
//! ├── store: StoreConfig
//! ├── rbac: RbacConfig
//! └── logging: LoggingConfig
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rolegate_core::{ProfileId, RoleDefinition, RoleName};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;

/// Secrets shorter than this are accepted with a warning.
pub const MIN_RECOMMENDED_SECRET_LEN: usize = 32;

/// Default clock-skew leeway in seconds.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for rolegate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolegateConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token verification configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Persistence backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Role seeding and provisioning.
    #[serde(default)]
    pub rbac: RbacConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RolegateConfig {
    /// Validates every section.
    ///
    /// A missing signing secret is an error here, so a misconfigured
    /// instance never starts serving.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.store.validate()?;
        self.rbac.validate()?;
        Ok(())
    }

    /// Returns non-fatal findings worth reporting.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(secret) = &self.auth.jwt_secret {
            if secret.len() < MIN_RECOMMENDED_SECRET_LEN {
                warnings.push(format!(
                    "auth.jwt_secret is shorter than {} bytes",
                    MIN_RECOMMENDED_SECRET_LEN
                ));
            }
        }
        if self.store.backend == StoreBackend::Memory {
            warnings.push("store.backend is 'memory': data is lost on restart".to_string());
        }
        if self.server.cors.allowed_origins.iter().any(|o| o == "*")
            && self.server.cors.allow_credentials
        {
            warnings.push("CORS allows any origin together with credentials".to_string());
        }
        if self.rbac.bootstrap_admins.is_empty() {
            warnings.push("rbac.bootstrap_admins is empty: no one can administer roles".to_string());
        }
        warnings
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base path for API routes.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Grace period for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_path() -> String {
    "/api/v1".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "cannot be zero",
            ));
        }
        if !self.base_path.starts_with('/') {
            return Err(ConfigError::validation(
                "server.base_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_PORT,
            base_path: default_base_path(),
            cors: CorsConfig::default(),
            request_timeout: default_request_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (use "*" for all). Empty disables CORS headers.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight max age.
    #[serde(default = "default_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

fn default_max_age() -> Duration {
    Duration::from_secs(3600)
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age: default_max_age(),
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

/// HMAC algorithm used to sign bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC-SHA256.
    #[default]
    HS256,
    /// HMAC-SHA384.
    HS384,
    /// HMAC-SHA512.
    HS512,
}

/// Bearer token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared signing secret. Required.
    #[serde(default)]
    pub jwt_secret: Option<SecretValue>,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Allowed clock skew for `exp`/`nbf`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,

    /// Paths served without authentication.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_leeway() -> u64 {
    DEFAULT_LEEWAY_SECS
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/ready".to_string()]
}

impl AuthConfig {
    /// Validates the auth configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.jwt_secret {
            None => Err(ConfigError::missing_field("auth.jwt_secret")),
            Some(secret) if secret.is_empty() => Err(ConfigError::validation(
                "auth.jwt_secret",
                "must not be empty",
            )),
            Some(_) => Ok(()),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            algorithm: JwtAlgorithm::default(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
            public_paths: default_public_paths(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Persistence backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process maps; nothing survives a restart.
    Memory,
    /// SQLite database file.
    #[default]
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database file for the SQLite backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Connection pool size for the SQLite backend.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/rolegate.db")
}

fn default_max_connections() -> u32 {
    5
}

impl StoreConfig {
    /// Validates the store configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Sqlite {
            if self.path.as_os_str().is_empty() {
                return Err(ConfigError::validation("store.path", "cannot be empty"));
            }
            if self.max_connections == 0 {
                return Err(ConfigError::validation(
                    "store.max_connections",
                    "cannot be zero",
                ));
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// RBAC Configuration
// =============================================================================

/// A role to create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleSeed {
    /// Role name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Role seeding and first-contact provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RbacConfig {
    /// Role attached to newly provisioned profiles. Empty disables it.
    #[serde(default = "default_baseline_role")]
    pub baseline_role: String,

    /// Seed `admin`, `user` and `moderator`.
    #[serde(default = "default_true")]
    pub seed_default_roles: bool,

    /// Extra roles to seed.
    #[serde(default)]
    pub roles: Vec<RoleSeed>,

    /// Profile ids that are granted `admin`.
    #[serde(default)]
    pub bootstrap_admins: Vec<String>,
}

fn default_baseline_role() -> String {
    rolegate_core::USER_ROLE.to_string()
}

fn default_true() -> bool {
    true
}

impl RbacConfig {
    /// Validates role names and bootstrap ids.
    pub fn validate(&self) -> ConfigResult<()> {
        self.baseline_role()?;
        self.role_definitions()?;
        if self.bootstrap_admins.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::validation(
                "rbac.bootstrap_admins",
                "profile ids cannot be empty",
            ));
        }
        Ok(())
    }

    /// Returns the parsed baseline role, `None` when disabled.
    pub fn baseline_role(&self) -> ConfigResult<Option<RoleName>> {
        if self.baseline_role.trim().is_empty() {
            return Ok(None);
        }
        RoleName::parse(&self.baseline_role)
            .map(Some)
            .map_err(|e| ConfigError::validation("rbac.baseline_role", e.to_string()))
    }

    /// Returns every role to seed, defaults first.
    pub fn role_definitions(&self) -> ConfigResult<Vec<RoleDefinition>> {
        let mut defs = if self.seed_default_roles {
            RoleDefinition::defaults()
        } else {
            Vec::new()
        };
        for (i, seed) in self.roles.iter().enumerate() {
            let name = RoleName::parse(&seed.name).map_err(|e| {
                ConfigError::validation(format!("rbac.roles[{}].name", i), e.to_string())
            })?;
            if defs.iter().any(|d| d.name == name) {
                continue;
            }
            defs.push(RoleDefinition {
                name,
                description: seed.description.clone(),
            });
        }
        Ok(defs)
    }

    /// Returns the bootstrap admin ids.
    pub fn bootstrap_admin_ids(&self) -> Vec<ProfileId> {
        self.bootstrap_admins
            .iter()
            .map(|id| ProfileId::new(id.trim()))
            .collect()
    }
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            baseline_role: default_baseline_role(),
            seed_default_roles: true,
            roles: Vec::new(),
            bootstrap_admins: Vec::new(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never prints its contents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretValue").field(&"***").finish()
    }
}
