// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every error renders as `{"error": {"code", "message", "details"?}}` with
//! the matching HTTP status. 401 responses carry `WWW-Authenticate: Bearer`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_core::{AuthFailure, ConflictKind, CoreError};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unauthorized (401).
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Why authentication failed.
        reason: AuthFailure,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Denial message.
        message: String,
        /// Role names that would have been accepted.
        required: Vec<String>,
    },

    /// Resource not found (404).
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity type.
        entity: String,
        /// Lookup key.
        key: String,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Conflict kind.
        kind: ConflictKind,
        /// Error message.
        message: String,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Offending field, if known.
        field: Option<String>,
        /// Error message.
        message: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates an unauthorized error.
    pub fn unauthorized(reason: AuthFailure) -> Self {
        Self::Unauthorized { reason }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            required: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: Option<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { .. } => "UNAUTHENTICATED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { kind, .. } => match kind {
                ConflictKind::AlreadyExists => "ALREADY_EXISTS",
                ConflictKind::AlreadyAssigned => "ALREADY_ASSIGNED",
                ConflictKind::NotAssigned => "NOT_ASSIGNED",
                ConflictKind::EmailTaken => "EMAIL_TAKEN",
            },
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::ServiceUnavailable { .. } => "STORE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message safe to show to callers.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { reason } => {
                format!("Could not validate credentials: {}", reason)
            }
            ApiError::Forbidden { message, .. } => message.clone(),
            ApiError::NotFound { entity, key } => format!("{} '{}' not found", entity, key),
            ApiError::Conflict { message, .. } => message.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable, retry later".to_string()
            }
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal { .. } | ApiError::ServiceUnavailable { .. }
        )
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Unauthorized { reason } => {
                Some(serde_json::json!({ "reason": reason.as_str() }))
            }
            ApiError::Forbidden { required, .. } if !required.is_empty() => {
                Some(serde_json::json!({ "required_roles": required }))
            }
            ApiError::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
                details: self.error_details(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated { reason } => ApiError::unauthorized(reason),
            CoreError::Forbidden { required, message } => ApiError::Forbidden { message, required },
            CoreError::NotFound { entity, key } => ApiError::not_found(entity, key),
            CoreError::Conflict { kind, message } => ApiError::Conflict { kind, message },
            CoreError::StoreUnavailable { message } => ApiError::service_unavailable(message),
            CoreError::Invalid { field, message } => ApiError::validation(Some(field), message),
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        ApiError::unauthorized(err.auth_failure())
    }
}

// =============================================================================
// Tests
// =============================================================================
