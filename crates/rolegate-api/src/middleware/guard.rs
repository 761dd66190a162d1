// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route-level authorization middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use rolegate_core::{GuardChain, Principal, RoleGuard};

use crate::error::ApiError;

// =============================================================================
// GuardLayer
// =============================================================================

/// Layer that evaluates a [`GuardChain`] against the request's principal.
///
/// Must run inside [`AuthLayer`](super::AuthLayer).
#[derive(Clone)]
pub struct GuardLayer {
    chain: Arc<GuardChain>,
}

impl GuardLayer {
    /// Creates a layer from a guard chain.
    pub fn new(chain: GuardChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// Requires an authenticated caller.
    pub fn authenticated() -> Self {
        Self::new(GuardChain::authenticated())
    }

    /// Requires the `admin` role.
    pub fn admin() -> Self {
        Self::new(GuardChain::admin())
    }

    /// Requires a role guard after authentication.
    pub fn roles(guard: RoleGuard) -> Self {
        Self::new(GuardChain::authenticated().require(guard))
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardMiddleware {
            inner,
            chain: self.chain.clone(),
        }
    }
}

// =============================================================================
// GuardMiddleware
// =============================================================================

/// Middleware for guard enforcement.
#[derive(Clone)]
pub struct GuardMiddleware<S> {
    inner: S,
    chain: Arc<GuardChain>,
}

impl<S> Service<Request<Body>> for GuardMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let chain = self.chain.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let denied = chain
                .evaluate(req.extensions().get::<Principal>())
                .err();

            match denied {
                None => inner.call(req).await,
                Some(e) => {
                    if let Some(principal) = req.extensions().get::<Principal>() {
                        tracing::warn!(
                            profile_id = %principal.id(),
                            roles = ?principal.roles.names(),
                            path = %req.uri().path(),
                            "Access denied"
                        );
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use axum::http::StatusCode;
    use chrono::Utc;
    use rolegate_core::{Profile, ProfileId, Role, RoleName, RoleSet};
    use tower::ServiceExt;

    fn ok_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req| async { Ok::<_, Infallible>(Response::new(Body::empty())) })
    }

    fn principal(roles: &[&str], active: bool) -> Principal {
        let profile = Profile::new(ProfileId::new("u1"), "u1@x", Utc::now()).with_active(active);
        let roles: RoleSet = roles
            .iter()
            .map(|r| Role::new(RoleName::parse(r).unwrap(), None))
            .collect();
        Principal::new(profile, roles)
    }

    fn request(principal: Option<Principal>) -> Request<Body> {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        if let Some(p) = principal {
            req.extensions_mut().insert(p);
        }
        req
    }

    #[tokio::test]
    async fn test_admin_granted() {
        let service = GuardLayer::admin().layer(ok_service());
        let response = service
            .oneshot(request(Some(principal(&["admin"], true))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_denied() {
        let service = GuardLayer::admin().layer(ok_service());
        let response = service
            .oneshot(request(Some(principal(&["user"], true))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_no_principal_is_unauthorized() {
        let service = GuardLayer::admin().layer(ok_service());
        let response = service.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_any_of_roles() {
        let guard = RoleGuard::any(["admin", "moderator"]);
        let service = GuardLayer::roles(guard).layer(ok_service());
        let response = service
            .oneshot(request(Some(principal(&["moderator"], true))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_inactive_rejected() {
        let chain = GuardChain::authenticated().require_active();
        let service = GuardLayer::new(chain).layer(ok_service());
        let response = service
            .oneshot(request(Some(principal(&["admin"], false))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
