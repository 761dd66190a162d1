// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built identities, principals, tokens and configurations.

use chrono::Utc;

use rolegate_api::{Claims, TokenVerifier};
use rolegate_config::{JwtAlgorithm, RolegateConfig, SecretValue, StoreBackend};
use rolegate_core::{Identity, Principal, Profile, ProfileId, Role, RoleName, RoleSet};

/// Signing secret shared by every fixture.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Token lifetime used by fixtures.
pub const TOKEN_TTL_SECS: i64 = 3600;

// =============================================================================
// Identities and Principals
// =============================================================================

/// An identity with the conventional `{id}@example.com` email.
pub fn identity(id: &str) -> Identity {
    Identity::new(id, format!("{}@example.com", id))
}

/// A role set built from names. Panics on invalid names.
pub fn role_set(names: &[&str]) -> RoleSet {
    names
        .iter()
        .map(|n| Role::new(RoleName::parse(n).expect("valid role name"), None))
        .collect()
}

/// A principal holding `roles`, with an unsaved active profile.
pub fn principal(id: &str, roles: &[&str]) -> Principal {
    let profile = Profile::new(ProfileId::new(id), format!("{}@example.com", id), Utc::now());
    Principal::new(profile, role_set(roles))
}

/// A principal holding `admin`.
pub fn admin_principal(id: &str) -> Principal {
    principal(id, &["admin"])
}

/// A principal holding only `user`.
pub fn user_principal(id: &str) -> Principal {
    principal(id, &["user"])
}

// =============================================================================
// Tokens
// =============================================================================

/// A verifier over [`TEST_SECRET`].
pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(TEST_SECRET, JwtAlgorithm::HS256).expect("test verifier")
}

/// Claims for `sub` with the conventional email.
pub fn claims_for(sub: &str) -> Claims {
    Claims::new(sub, TOKEN_TTL_SECS).with_email(format!("{}@example.com", sub))
}

/// Signs `claims` with [`TEST_SECRET`].
pub fn sign(claims: &Claims) -> String {
    test_verifier().sign(claims).expect("signing succeeds")
}

/// A valid bearer token for `sub`.
pub fn token_for(sub: &str) -> String {
    sign(&claims_for(sub))
}

/// A token that expired an hour ago.
pub fn expired_token(sub: &str) -> String {
    sign(&Claims::new(sub, -TOKEN_TTL_SECS))
}

/// A token for `sub` signed with a different secret.
pub fn foreign_token(sub: &str) -> String {
    TokenVerifier::new("some-other-secret-0123456789abcdefghij", JwtAlgorithm::HS256)
        .and_then(|v| v.sign(&claims_for(sub)))
        .expect("signing succeeds")
}

// =============================================================================
// Configurations
// =============================================================================

/// A valid in-memory configuration.
pub fn memory_config() -> RolegateConfig {
    let mut config = RolegateConfig::default();
    config.auth.jwt_secret = Some(SecretValue::new(TEST_SECRET));
    config.store.backend = StoreBackend::Memory;
    config
}

/// A minimal valid YAML document.
pub const MINIMAL_YAML: &str = r#"
auth:
  jwt_secret: "integration-test-secret-0123456789abcdef"
"#;

/// A YAML document touching every section.
pub const FULL_YAML: &str = r#"
server:
  bind_address: "127.0.0.1"
  port: 9090
  base_path: "/rbac"
  request_timeout: "10s"
  shutdown_timeout: "5s"
  cors:
    allowed_origins: ["https://app.example.com"]
    allow_credentials: true
auth:
  jwt_secret: "integration-test-secret-0123456789abcdef"
  algorithm: HS512
  leeway_secs: 30
store:
  backend: sqlite
  path: "data/rolegate.db"
  max_connections: 4
rbac:
  baseline_role: user
  roles:
    - name: auditor
      description: "Read-only access to audit data"
  bootstrap_admins: ["founder"]
logging:
  level: debug
  format: json
"#;
