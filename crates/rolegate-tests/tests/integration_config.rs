// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Loading, validation and environment overrides for rolegate-config.
//!
//! ## Test Categories
//!
//! - `test_load_*`: Parsing in every supported format
//! - `test_validation_*`: Rejected configurations
//! - `test_env_*`: Environment overrides and placeholders
//! - `test_rbac_*`: Role seeding helpers

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use rolegate_config::{
    load_config_str, ConfigError, ConfigFormat, ConfigLoader, JwtAlgorithm, LogFormat,
    RolegateConfig, StoreBackend,
};
use rolegate_core::RoleName;
use rolegate_tests::prelude::*;

/// Loader that never reads the process environment.
fn isolated() -> ConfigLoader {
    ConfigLoader::new().with_env_vars(false)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_minimal_yaml_uses_defaults() {
    let config = isolated()
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.base_path, "/api/v1");
    assert_eq!(config.auth.algorithm, JwtAlgorithm::HS256);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.path.to_str(), Some("./data/rolegate.db"));
    assert_eq!(config.rbac.baseline_role, "user");
    assert!(config.rbac.bootstrap_admins.is_empty());
    assert_eq!(config.logging.level.as_str(), "info");
    assert_eq!(
        config.auth.public_paths,
        vec!["/health".to_string(), "/ready".to_string()]
    );
}

#[test]
fn test_load_full_yaml() {
    let config = isolated()
        .load_from_str(FULL_YAML, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(
        config.server.bind_address,
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.base_path, "/rbac");
    assert_eq!(config.server.request_timeout, Duration::from_secs(10));
    assert_eq!(config.server.shutdown_timeout, Duration::from_secs(5));
    assert!(config.server.cors.allow_credentials);

    assert_eq!(config.auth.algorithm, JwtAlgorithm::HS512);
    assert_eq!(config.auth.leeway_secs, 30);

    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.max_connections, 4);

    assert_eq!(config.logging.level.as_str(), "debug");
    assert!(matches!(config.logging.format, LogFormat::Json));
}

#[test]
fn test_load_toml() {
    let toml = r#"
[server]
port = 7000

[auth]
jwt_secret = "integration-test-secret-0123456789abcdef"
algorithm = "HS384"

[rbac]
bootstrap_admins = ["ops"]
"#;
    let config = isolated().load_from_str(toml, ConfigFormat::Toml).unwrap();
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.auth.algorithm, JwtAlgorithm::HS384);
    assert_eq!(config.rbac.bootstrap_admins, vec!["ops".to_string()]);
}

#[test]
fn test_load_json() {
    let json = r#"{
        "auth": { "jwt_secret": "integration-test-secret-0123456789abcdef" },
        "rbac": { "baseline_role": "" }
    }"#;
    let config = isolated().load_from_str(json, ConfigFormat::Json).unwrap();
    assert!(config.rbac.baseline_role().unwrap().is_none());
}

#[test]
fn test_load_file_resolves_store_path() {
    let dir = temp_test_dir("rolegate-config");
    let path = dir.path().join("rolegate.yaml");
    fs::write(&path, FULL_YAML).unwrap();

    let config = isolated().load(&path).unwrap();
    assert_eq!(config.store.path, dir.path().join("data/rolegate.db"));

    let raw = isolated().with_path_resolution(false).load(&path).unwrap();
    assert_eq!(raw.store.path.to_str(), Some("data/rolegate.db"));
}

#[test]
fn test_load_missing_file() {
    let dir = temp_test_dir("rolegate-config");
    let err = isolated()
        .load(dir.path().join("absent.yaml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }), "{:?}", err);
}

#[test]
fn test_load_unknown_extension() {
    let dir = temp_test_dir("rolegate-config");
    let path = dir.path().join("rolegate.ini");
    fs::write(&path, "port = 1").unwrap();

    let err = isolated().load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }), "{:?}", err);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_requires_secret() {
    let err = isolated()
        .load_from_str("server:\n  port: 8081\n", ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref field } if field == "auth.jwt_secret"));
    assert!(err.is_secret_error());
}

#[test]
fn test_validation_rejects_empty_secret() {
    let err = isolated()
        .load_from_str("auth:\n  jwt_secret: \"\"\n", ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth.jwt_secret"));
}

#[test]
fn test_validation_rejects_unknown_fields() {
    let yaml = format!("{}\nauthz:\n  enabled: true\n", MINIMAL_YAML);
    assert!(isolated().load_from_str(&yaml, ConfigFormat::Yaml).is_err());

    let yaml = r#"
auth:
  jwt_secret: "integration-test-secret-0123456789abcdef"
  issuer: "someone"
"#;
    assert!(isolated().load_from_str(yaml, ConfigFormat::Yaml).is_err());
}

#[test]
fn test_validation_rejects_bad_role_names() {
    let yaml = format!("{}\nrbac:\n  baseline_role: \"Power User\"\n", MINIMAL_YAML);
    let err = isolated()
        .load_from_str(&yaml, ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "rbac.baseline_role"));

    let yaml = format!("{}\nrbac:\n  roles:\n    - name: \"\"\n", MINIMAL_YAML);
    let err = isolated()
        .load_from_str(&yaml, ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "rbac.roles[0].name"));
}

#[test]
fn test_validation_rejects_blank_bootstrap_id() {
    let yaml = format!("{}\nrbac:\n  bootstrap_admins: [\"  \"]\n", MINIMAL_YAML);
    assert!(isolated().load_from_str(&yaml, ConfigFormat::Yaml).is_err());
}

#[test]
fn test_validation_server_limits() {
    let mut config = isolated()
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap();

    config.server.base_path = "api".to_string();
    assert!(config.validate().is_err());

    config.server.base_path = "/api".to_string();
    config.server.max_body_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_sqlite_pool() {
    let yaml = format!(
        "{}\nstore:\n  backend: sqlite\n  max_connections: 0\n",
        MINIMAL_YAML
    );
    let err = isolated()
        .load_from_str(&yaml, ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "store.max_connections"));
}

#[test]
fn test_validation_default_config_fails() {
    assert!(RolegateConfig::default().validate().is_err());
}

// =============================================================================
// Environment
// =============================================================================

#[test]
fn test_env_overrides() {
    let prefix = "RG_IT_OVERRIDE";
    std::env::set_var(format!("{}_PORT", prefix), "9443");
    std::env::set_var(format!("{}_STORE_BACKEND", prefix), "SQLite");
    std::env::set_var(format!("{}_BOOTSTRAP_ADMINS", prefix), "alice, bob,,");
    std::env::set_var(format!("{}_LOG_LEVEL", prefix), "warning");

    let config = ConfigLoader::new()
        .with_env_prefix(prefix)
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.server.port, 9443);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(
        config.rbac.bootstrap_admins,
        vec!["alice".to_string(), "bob".to_string()]
    );
    assert_eq!(config.logging.level.as_str(), "warn");
}

#[test]
fn test_env_invalid_port() {
    let prefix = "RG_IT_BADPORT";
    std::env::set_var(format!("{}_PORT", prefix), "eighty");

    let err = ConfigLoader::new()
        .with_env_prefix(prefix)
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "RG_IT_BADPORT_PORT"));
}

#[test]
fn test_env_supplies_secret() {
    let prefix = "RG_IT_SECRET";
    std::env::set_var(format!("{}_JWT_SECRET", prefix), TEST_SECRET);

    let config = ConfigLoader::new()
        .with_env_prefix(prefix)
        .load_from_env()
        .unwrap();
    assert_eq!(
        config.auth.jwt_secret.as_ref().map(|s| s.expose()),
        Some(TEST_SECRET)
    );
}

#[test]
fn test_env_placeholders() {
    std::env::set_var("RG_IT_PLACEHOLDER_SECRET", TEST_SECRET);
    let yaml = r#"
server:
  port: ${RG_IT_PLACEHOLDER_UNSET_PORT:8181}
auth:
  jwt_secret: "${RG_IT_PLACEHOLDER_SECRET}"
"#;
    let config = ConfigLoader::new()
        .with_env_prefix("RG_IT_PLACEHOLDER")
        .load_from_str(yaml, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.server.port, 8181);
    assert_eq!(
        config.auth.jwt_secret.as_ref().map(|s| s.expose()),
        Some(TEST_SECRET)
    );
}

#[test]
fn test_env_disabled_ignores_overrides() {
    let prefix = "RG_IT_DISABLED";
    std::env::set_var(format!("{}_PORT", prefix), "1234");

    let config = ConfigLoader::new()
        .with_env_prefix(prefix)
        .with_env_vars(false)
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap();
    assert_eq!(config.server.port, 8080);
}

// =============================================================================
// RBAC Helpers
// =============================================================================

#[test]
fn test_rbac_role_definitions() {
    let config = load_config_str(FULL_YAML, ConfigFormat::Yaml).unwrap();
    let defs = config.rbac.role_definitions().unwrap();
    let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();

    assert_eq!(names, ["admin", "user", "moderator", "auditor"]);
    assert_eq!(
        defs[3].description.as_deref(),
        Some("Read-only access to audit data")
    );
}

#[test]
fn test_rbac_custom_roles_without_defaults() {
    let yaml = format!(
        "{}\nrbac:\n  seed_default_roles: false\n  baseline_role: \"\"\n  roles:\n    - name: admin\n    - name: admin\n    - name: reviewer\n",
        MINIMAL_YAML
    );
    let config = isolated().load_from_str(&yaml, ConfigFormat::Yaml).unwrap();
    let names: Vec<_> = config
        .rbac
        .role_definitions()
        .unwrap()
        .into_iter()
        .map(|d| d.name.as_str().to_string())
        .collect();
    assert_eq!(names, ["admin", "reviewer"]);
}

#[test]
fn test_rbac_baseline_and_bootstrap() {
    let config = isolated()
        .load_from_str(FULL_YAML, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.rbac.baseline_role().unwrap(), Some(RoleName::user()));
    let ids = config.rbac.bootstrap_admin_ids();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].as_str(), "founder");
}

#[test]
fn test_rbac_warnings() {
    let minimal = isolated()
        .load_from_str(MINIMAL_YAML, ConfigFormat::Yaml)
        .unwrap();
    let warnings = minimal.warnings();
    assert!(!warnings.iter().any(|w| w.contains("memory")));
    assert!(warnings.iter().any(|w| w.contains("bootstrap_admins")));

    let yaml = format!("{}\nstore:\n  backend: memory\n", MINIMAL_YAML);
    let volatile = isolated().load_from_str(&yaml, ConfigFormat::Yaml).unwrap();
    assert!(volatile.warnings().iter().any(|w| w.contains("memory")));

    let full = isolated()
        .load_from_str(FULL_YAML, ConfigFormat::Yaml)
        .unwrap();
    assert!(full.warnings().is_empty(), "{:?}", full.warnings());
}
