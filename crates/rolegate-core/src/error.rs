// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for rolegate.
//!
//! ```text
//! CoreError
//! ├── Unauthenticated   - no usable credentials (401)
//! ├── Forbidden         - authenticated, but a guard denied the call (403)
//! ├── NotFound          - referenced profile or role does not exist (404)
//! ├── Conflict          - duplicate role, membership state, taken email (409)
//! ├── StoreUnavailable  - transient store failure, retryable (503)
//! └── Invalid           - malformed input (422)
//! ```
//!
//! Stores report [`StoreError`], which converts into [`CoreError`].
//!
//! # Examples
//!
//! ```
//! use rolegate_core::error::{CoreError, StoreError};
//!
//! let err: CoreError = StoreError::unavailable("connection reset").into();
//! assert!(err.is_retryable());
//! assert_eq!(err.status_code(), 503);
//! ```

use std::fmt;
use thiserror::Error;

// =============================================================================
// AuthFailure
// =============================================================================

/// Why a caller could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// No bearer credentials were presented.
    MissingCredentials,
    /// Token could not be parsed or its signature did not verify.
    Malformed,
    /// Token signature is valid but it has expired.
    Expired,
    /// Token has no usable subject.
    MissingSubject,
    /// Any other verification failure.
    Rejected,
}

impl AuthFailure {
    /// Returns the failure as a stable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredentials => "missing_credentials",
            AuthFailure::Malformed => "malformed",
            AuthFailure::Expired => "expired",
            AuthFailure::MissingSubject => "missing_subject",
            AuthFailure::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AuthFailure::MissingCredentials => "missing bearer token",
            AuthFailure::Malformed => "invalid token",
            AuthFailure::Expired => "token has expired",
            AuthFailure::MissingSubject => "token has no subject",
            AuthFailure::Rejected => "could not validate credentials",
        };
        f.write_str(msg)
    }
}

// =============================================================================
// ConflictKind
// =============================================================================

/// The kind of state conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A record with the same unique key already exists.
    AlreadyExists,
    /// The profile already holds the role.
    AlreadyAssigned,
    /// The profile does not hold the role.
    NotAssigned,
    /// The email belongs to another profile.
    EmailTaken,
}

impl ConflictKind {
    /// Returns the kind as a stable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::AlreadyExists => "already_exists",
            ConflictKind::AlreadyAssigned => "already_assigned",
            ConflictKind::NotAssigned => "not_assigned",
            ConflictKind::EmailTaken => "email_taken",
        }
    }
}

// =============================================================================
// CoreError
// =============================================================================

/// Errors surfaced by identity resolution, provisioning and access control.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The caller is not authenticated.
    #[error("Authentication failed: {reason}")]
    Unauthenticated {
        /// Failure reason.
        reason: AuthFailure,
    },

    /// The caller is authenticated but not allowed.
    #[error("{message}")]
    Forbidden {
        /// Role names that would have been accepted.
        required: Vec<String>,
        /// Human-readable denial.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity type ("profile", "role").
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// The requested change conflicts with existing state.
    #[error("{message}")]
    Conflict {
        /// Conflict kind.
        kind: ConflictKind,
        /// Human-readable detail.
        message: String,
    },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Detail from the store.
        message: String,
    },

    /// Input failed validation.
    #[error("Invalid {field}: {message}")]
    Invalid {
        /// Offending field.
        field: String,
        /// Reason.
        message: String,
    },
}

impl CoreError {
    /// Creates an unauthenticated error.
    pub fn unauthenticated(reason: AuthFailure) -> Self {
        Self::Unauthenticated { reason }
    }

    /// Creates a forbidden error listing acceptable roles.
    pub fn forbidden(required: Vec<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            required,
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            message: message.into(),
        }
    }

    /// Creates a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable { .. })
    }

    /// Returns `true` for authentication failures.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, CoreError::Unauthenticated { .. })
    }

    /// Returns `true` for authorization denials.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, CoreError::Forbidden { .. })
    }

    /// Returns the stable kind string.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Unauthenticated { .. } => "unauthenticated",
            CoreError::Forbidden { .. } => "forbidden",
            CoreError::NotFound { .. } => "not_found",
            CoreError::Conflict { kind, .. } => kind.as_str(),
            CoreError::StoreUnavailable { .. } => "store_unavailable",
            CoreError::Invalid { .. } => "invalid",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Unauthenticated { .. } => 401,
            CoreError::Forbidden { .. } => 403,
            CoreError::NotFound { .. } => 404,
            CoreError::Conflict { .. } => 409,
            CoreError::StoreUnavailable { .. } => 503,
            CoreError::Invalid { .. } => 422,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// StoreError
// =============================================================================

/// Errors reported by [`ProfileStore`](crate::store::ProfileStore) and
/// [`RoleCatalog`](crate::store::RoleCatalog) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("Duplicate {entity}: {key}")]
    DuplicateKey {
        /// Entity type.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The record to modify does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity type.
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// The store is unreachable or failed transiently.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Detail.
        message: String,
        /// Underlying driver error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a duplicate-key error.
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            key: key.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates an unavailable error without a source.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unavailable error wrapping a driver error.
    pub fn unavailable_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for uniqueness violations.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { entity, key } => CoreError::conflict(
                ConflictKind::AlreadyExists,
                format!("{} '{}' already exists", entity, key),
            ),
            StoreError::NotFound { entity, key } => CoreError::not_found(entity, key),
            StoreError::Unavailable { message, .. } => CoreError::store_unavailable(message),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
