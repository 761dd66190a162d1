// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token verification.

use std::sync::Arc;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;

use rolegate_config::schema::MIN_RECOMMENDED_SECRET_LEN;
use rolegate_config::{AuthConfig, JwtAlgorithm};
use rolegate_core::{AuthFailure, CoreError};

use super::Claims;

// =============================================================================
// TokenError
// =============================================================================

/// Token verification failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature is valid but the token is past its expiry.
    #[error("Token has expired")]
    Expired,

    /// Token could not be parsed or its signature did not verify.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Decoder detail.
        message: String,
    },

    /// Any other verification failure.
    #[error("Token rejected: {message}")]
    Rejected {
        /// Decoder detail.
        message: String,
    },

    /// The verifier cannot be built from its configuration.
    #[error("Token verifier misconfigured: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },
}

impl TokenError {
    /// Creates a malformed-token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a rejected-token error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns the authentication failure this error represents.
    pub fn auth_failure(&self) -> AuthFailure {
        match self {
            TokenError::Expired => AuthFailure::Expired,
            TokenError::Malformed { .. } => AuthFailure::Malformed,
            TokenError::Rejected { .. } | TokenError::Configuration { .. } => {
                AuthFailure::Rejected
            }
        }
    }
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        CoreError::unauthenticated(err.auth_failure())
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::malformed(err.to_string()),
            _ => TokenError::rejected(err.to_string()),
        }
    }
}

// =============================================================================
// TokenVerifier
// =============================================================================

/// Verifies bearer tokens against a shared HMAC secret.
///
/// Audience is not checked; `exp` is mandatory.
#[derive(Clone)]
pub struct TokenVerifier {
    algorithm: Algorithm,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenVerifier {
    /// Creates a verifier for the given secret and algorithm.
    pub fn new(secret: &str, algorithm: JwtAlgorithm) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::configuration("signing secret is empty"));
        }
        if secret.len() < MIN_RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "Signing secret is shorter than recommended ({} bytes)",
                MIN_RECOMMENDED_SECRET_LEN
            );
        }

        let algorithm = match algorithm {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            algorithm,
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
        })
    }

    /// Creates a verifier from the auth configuration section.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let secret = config
            .jwt_secret
            .as_ref()
            .ok_or_else(|| TokenError::configuration("auth.jwt_secret is not set"))?;
        Ok(Self::new(secret.expose(), config.algorithm)?.with_leeway(config.leeway_secs))
    }

    /// Sets the allowed clock skew in seconds.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        let mut validation = (*self.validation).clone();
        validation.leeway = leeway_secs;
        self.validation = Arc::new(validation);
        self
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }

    /// Signs claims with the configured secret.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::configuration(format!("Failed to sign token: {}", e)))
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, JwtAlgorithm::HS256)
            .unwrap()
            .with_leeway(0)
    }

    #[test]
    fn test_sign_and_verify() {
        let verifier = verifier();
        let claims = Claims::new("u1", 3600).with_email("u1@x");

        let token = verifier.sign(&claims).unwrap();
        let decoded = verifier.verify(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_expired_token() {
        let verifier = verifier();
        let token = verifier.sign(&Claims::new("u1", -3600)).unwrap();

        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
        assert_eq!(err.auth_failure(), AuthFailure::Expired);
    }

    #[test]
    fn test_leeway_accepts_recent_expiry() {
        let verifier = verifier().with_leeway(120);
        let token = verifier.sign(&Claims::new("u1", -30)).unwrap();
        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let other = TokenVerifier::new("a-completely-different-secret-value!!", JwtAlgorithm::HS256)
            .unwrap();
        let token = other.sign(&Claims::new("u1", 3600)).unwrap();

        let err = verifier().verify(&token).unwrap_err();
        assert_eq!(err.auth_failure(), AuthFailure::Malformed);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = verifier().verify("invalid.token.here").unwrap_err();
        assert_eq!(err.auth_failure(), AuthFailure::Malformed);

        let err = verifier().verify("not-a-jwt").unwrap_err();
        assert_eq!(err.auth_failure(), AuthFailure::Malformed);
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = TokenVerifier::new(SECRET, JwtAlgorithm::HS512).unwrap();
        let token = hs512.sign(&Claims::new("u1", 3600)).unwrap();

        let err = verifier().verify(&token).unwrap_err();
        assert_eq!(err.auth_failure(), AuthFailure::Rejected);
    }

    #[test]
    fn test_missing_subject_still_decodes() {
        let verifier = verifier();
        let token = verifier
            .sign(&Claims::new("u1", 3600).without_subject())
            .unwrap();
        assert!(verifier.verify(&token).unwrap().sub.is_none());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = TokenVerifier::new("", JwtAlgorithm::HS256).unwrap_err();
        assert!(matches!(err, TokenError::Configuration { .. }));
    }

    #[test]
    fn test_from_config_requires_secret() {
        let config = AuthConfig::default();
        assert!(TokenVerifier::from_config(&config).is_err());
    }

    #[test]
    fn test_into_core_error() {
        let err: CoreError = TokenError::Expired.into();
        assert!(err.is_unauthenticated());
        assert_eq!(err.status_code(), 401);
    }
}
