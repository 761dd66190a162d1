// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for rolegate.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and resolve `${VAR}` / `${VAR:default}` placeholders
//! 2. Parse YAML, TOML or JSON by extension
//! 3. Apply `ROLEGATE_*` environment overrides
//! 4. Resolve the store path relative to the config file
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! ROLEGATE_JWT_SECRET=...
//! ROLEGATE_PORT=9090
//! ROLEGATE_BIND_ADDRESS=127.0.0.1
//! ROLEGATE_STORE_BACKEND=memory
//! ROLEGATE_DATABASE_PATH=/var/lib/rolegate/rolegate.db
//! ROLEGATE_LOG_LEVEL=debug
//! ROLEGATE_BOOTSTRAP_ADMINS=uid-1,uid-2
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogLevel, RolegateConfig, SecretValue, StoreBackend};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for rolegate.
///
/// # Examples
///
/// ```no_run
/// use rolegate_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("rolegate.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply env overrides.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths against the config file.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: "ROLEGATE".to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable handling.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads and validates configuration from a file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<RolegateConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            let base = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            resolve_relative_paths(&mut config, &base);
        }

        config.validate()?;
        debug!(
            backend = %config.store.backend,
            port = config.server.port,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<RolegateConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };
        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from defaults and environment variables only.
    pub fn load_from_env(&self) -> ConfigResult<RolegateConfig> {
        let mut config = RolegateConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<RolegateConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unset variables without a default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return Ok(result);
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match (env::var(name), default) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", name);
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }
            rest = &after[end + 1..];
        }

        result.push_str(rest);
        Ok(result)
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    fn apply_env_overrides(&self, config: &mut RolegateConfig) -> ConfigResult<()> {
        if let (_, Some(value)) = self.var("JWT_SECRET") {
            config.auth.jwt_secret = Some(SecretValue::new(value));
        }

        if let (name, Some(value)) = self.var("PORT") {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }

        if let (name, Some(value)) = self.var("BIND_ADDRESS") {
            config.server.bind_address = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected IP address"))?;
        }

        if let (name, Some(value)) = self.var("STORE_BACKEND") {
            config.store.backend = match value.to_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "sqlite" => StoreBackend::Sqlite,
                _ => {
                    return Err(ConfigError::invalid_env_var(
                        name,
                        "expected 'memory' or 'sqlite'",
                    ))
                }
            };
        }

        if let (_, Some(value)) = self.var("DATABASE_PATH") {
            config.store.path = PathBuf::from(value);
        }

        if let (_, Some(value)) = self.var("LOG_LEVEL") {
            if let Some(level) = parse_log_level(&value) {
                config.logging.level = level;
            }
        }

        if let (_, Some(value)) = self.var("BOOTSTRAP_ADMINS") {
            config.rbac.bootstrap_admins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_relative_paths(config: &mut RolegateConfig, base: &Path) {
    if config.store.path.is_relative() {
        config.store.path = base.join(&config.store.path);
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<RolegateConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<RolegateConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<RolegateConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
