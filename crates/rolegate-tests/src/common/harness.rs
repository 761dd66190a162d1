// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! An in-process router over a fresh store, with request helpers that
//! return the status and decoded JSON body.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use rolegate_api::{ApiServer, AppState};
use rolegate_config::ServerConfig;
use rolegate_core::{
    ProfileId, ProfileStore, RoleAdministration, RoleCatalog, RoleDefinition, RoleName,
};
use rolegate_store::MemoryStore;

use super::fixtures::{test_verifier, token_for};
use super::init_test_logging;

// =============================================================================
// TestApp
// =============================================================================

/// A router over seeded stores.
pub struct TestApp {
    router: Router,
    /// Profile store behind the router.
    pub profiles: Arc<dyn ProfileStore>,
    /// Role catalog behind the router.
    pub catalog: Arc<dyn RoleCatalog>,
    /// Base path the routes are mounted under.
    pub base_path: String,
}

impl TestApp {
    /// Builds an app over a fresh [`MemoryStore`] with default roles seeded.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store, ServerConfig::default()).await
    }

    /// Builds an app over the given stores.
    pub async fn with_stores(
        profiles: Arc<dyn ProfileStore>,
        catalog: Arc<dyn RoleCatalog>,
        config: ServerConfig,
    ) -> Self {
        init_test_logging();

        RoleAdministration::new(profiles.clone(), catalog.clone())
            .ensure_roles(&RoleDefinition::defaults())
            .await
            .expect("seeding default roles");

        let base_path = config.base_path.trim_end_matches('/').to_string();
        let state = AppState::builder()
            .config(config)
            .verifier(Arc::new(test_verifier()))
            .profiles(profiles.clone())
            .catalog(catalog.clone())
            .baseline_role(Some(RoleName::user()))
            .build()
            .expect("building app state");

        Self {
            router: ApiServer::new(state).router(),
            profiles,
            catalog,
            base_path,
        }
    }

    /// Prefixes `suffix` with the base path.
    pub fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.base_path, suffix)
    }

    /// Returns a token for `sub` after making sure its profile exists.
    pub async fn login(&self, sub: &str) -> String {
        let token = token_for(sub);
        let (status, _) = self.get("/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK, "first contact for {}", sub);
        token
    }

    /// Logs `sub` in and grants them `admin` directly through the catalog.
    pub async fn login_admin(&self, sub: &str) -> String {
        let token = self.login(sub).await;
        let granted = RoleAdministration::new(self.profiles.clone(), self.catalog.clone())
            .grant_system(&ProfileId::new(sub), &RoleName::admin())
            .await
            .expect("granting admin");
        assert!(granted, "{} should not already be admin", sub);
        token
    }

    /// Sends a GET to `base_path + suffix`.
    pub async fn get(&self, suffix: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, &self.path(suffix), token, None).await
    }

    /// Sends a POST with a JSON body.
    pub async fn post(&self, suffix: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, &self.path(suffix), token, Some(body))
            .await
    }

    /// Sends a PUT with a JSON body.
    pub async fn put(&self, suffix: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, &self.path(suffix), token, Some(body))
            .await
    }

    /// Sends a DELETE.
    pub async fn delete(&self, suffix: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, &self.path(suffix), token, None)
            .await
    }

    /// Sends a request to an absolute path.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send_raw(request).await
    }

    /// Sends a prepared request and returns the raw response.
    pub async fn call(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Sends a prepared request.
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.call(request).await;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("reading body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
