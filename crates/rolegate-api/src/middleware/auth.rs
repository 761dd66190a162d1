// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::Authenticator;
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer authentication.
///
/// On success the request carries a [`Principal`](rolegate_core::Principal)
/// extension. Public paths pass through without one.
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            authenticator,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets paths that don't require authentication.
    ///
    /// A trailing `*` matches by prefix.
    pub fn with_public_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }
        self.public_paths.iter().any(|public| {
            public
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let authenticator = self.authenticator.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            match authenticator.authenticate_header(header).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    inner.call(req).await
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::warn!(error = %e, "Authentication aborted by store failure");
                    } else {
                        tracing::debug!(error = %e, "Authentication failed");
                    }
                    Ok(ApiError::from(e).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
