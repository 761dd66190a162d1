// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Query},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use rolegate_core::{AuthFailure, Page, Principal, MAX_PAGE_SIZE};

use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for the authenticated caller.
///
/// Reads the [`Principal`] attached by the auth middleware. Returns 401 when
/// none is present.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(principal): Auth) -> impl IntoResponse {
///     format!("Hello, {}", principal.id())
/// }
/// ```
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized(AuthFailure::MissingCredentials))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads with API-shaped rejections.
///
/// Syntax errors are 400; well-formed JSON of the wrong shape is 422.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonDataError(e) => ApiError::validation(None, e.body_text()),
                other => ApiError::bad_request(format!("Invalid JSON: {}", other.body_text())),
            })?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Pagination Extractor
// =============================================================================

/// Query parameters for offset pagination.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationParams {
    /// Records to skip.
    #[serde(default)]
    pub offset: usize,
    /// Page size, capped at [`MAX_PAGE_SIZE`].
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    MAX_PAGE_SIZE
}

impl PaginationParams {
    /// Converts to a core page.
    pub fn to_page(&self) -> Result<Page, ApiError> {
        Page::new(self.offset, self.limit).map_err(ApiError::from)
    }
}

/// Extractor for pagination parameters.
pub struct Pagination(pub Page);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::validation(
                    None,
                    format!("Invalid pagination parameters: {}", e.body_text()),
                )
            })?;

        Ok(Pagination(params.to_page()?))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams {
            offset: 20,
            limit: 10,
        };
        let page = params.to_page().unwrap();
        assert_eq!(page.offset, 20);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn test_pagination_limit_cap() {
        let params = PaginationParams {
            offset: 0,
            limit: 500,
        };
        assert_eq!(params.to_page().unwrap().limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_zero_limit() {
        let params = PaginationParams {
            offset: 0,
            limit: 0,
        };
        let err = params.to_page().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
