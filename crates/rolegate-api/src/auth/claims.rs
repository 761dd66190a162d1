// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by an identity provider's access token.
///
/// Only `exp` is structurally required. A missing `sub` decodes fine and is
/// rejected later by the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the identity provider's user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    // =========================================================================
    // Provider Claims
    // =========================================================================
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Provider-managed user metadata.
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// The `user_metadata` object of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Advertised role. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Creates claims for a subject expiring `expires_in_secs` from now.
    pub fn new(subject: impl Into<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: Some(subject.into()),
            exp: now + expires_in_secs,
            iat: Some(now),
            iss: None,
            email: None,
            user_metadata: UserMetadata::default(),
        }
    }

    /// Sets the email claim.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets `user_metadata.role`.
    pub fn with_role_hint(mut self, role: impl Into<String>) -> Self {
        self.user_metadata.role = Some(role.into());
        self
    }

    /// Removes the subject.
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns `true` if the token has expired, ignoring leeway.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("u1", 3600)
            .with_email("u1@x")
            .with_role_hint("moderator");

        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.email.as_deref(), Some("u1@x"));
        assert_eq!(claims.user_metadata.role.as_deref(), Some("moderator"));
        assert!(!claims.is_expired());
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_decode_provider_payload() {
        let json = r#"{
            "sub": "8f2c",
            "exp": 4102444800,
            "aud": "authenticated",
            "email": "a@b.c",
            "user_metadata": {"role": "admin", "full_name": "A B"},
            "app_metadata": {}
        }"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("8f2c"));
        assert_eq!(claims.user_metadata.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_decode_without_metadata() {
        let claims: Claims = serde_json::from_str(r#"{"exp": 1}"#).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.user_metadata.role.is_none());
        assert!(claims.is_expired());
    }
}
