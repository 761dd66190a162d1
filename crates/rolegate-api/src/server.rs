// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use rolegate_config::CorsConfig;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, GuardLayer};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let config = &self.state.config;
        let base = config.base_path.trim_end_matches('/');
        let path = |suffix: &str| format!("{}{}", base, suffix);

        let auth = AuthLayer::new(self.state.authenticator.clone())
            .with_public_paths(self.state.public_paths.iter().cloned());

        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout,
            ))
            .layer(create_cors_layer(&config.cors))
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(auth);

        let self_service = Router::new().route(
            &path("/users/me"),
            get(handlers::current_user).put(handlers::update_current_user),
        );

        let administration = Router::new()
            .route(&path("/users"), get(handlers::list_users))
            .route(&path("/users/{id}"), get(handlers::get_user))
            .route(
                &path("/users/{id}/roles"),
                get(handlers::user_roles).post(handlers::assign_role),
            )
            .route(
                &path("/users/{id}/roles/{role}"),
                delete(handlers::unassign_role),
            )
            .route(
                &path("/roles"),
                get(handlers::list_roles).post(handlers::create_role),
            )
            .route_layer(GuardLayer::admin());

        Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .merge(self_service)
            .merge(administration)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until `shutdown_signal` resolves.
    ///
    /// In-flight requests are drained before this returns.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            info!("Starting API server on {}", addr);
        }

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");
        Ok(())
    }

    /// Returns the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.state.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// An empty origin list emits no CORS headers.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .max_age(cors.max_age)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let wildcard = cors.allowed_origins.iter().any(|o| o == "*");
    if wildcard && cors.allow_credentials {
        warn!("CORS wildcard with credentials: mirroring request origin");
        layer = layer.allow_origin(AllowOrigin::mirror_request());
    } else if wildcard {
        layer = layer.allow_origin(Any);
    } else if !cors.allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer = layer.allow_origin(origins);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use rolegate_config::{JwtAlgorithm, ServerConfig};
    use rolegate_store::MemoryStore;
    use tower::ServiceExt;

    use crate::auth::TokenVerifier;

    fn server(config: ServerConfig) -> ApiServer {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::builder()
            .config(config)
            .verifier(Arc::new(
                TokenVerifier::new("test-secret-key-that-is-long-enough", JwtAlgorithm::HS256)
                    .unwrap(),
            ))
            .profiles(store.clone())
            .catalog(store)
            .build()
            .unwrap();
        ApiServer::new(state)
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(server(ServerConfig::default()).addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let router = server(ServerConfig::default()).router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let config = ServerConfig {
            base_path: "/rbac/".to_string(),
            ..ServerConfig::default()
        };
        let router = server(config).router();
        let response = router
            .oneshot(Request::get("/rbac/users/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_cors_layer_variants() {
        let mut cors = CorsConfig::default();
        let _ = create_cors_layer(&cors);

        cors.allowed_origins = vec!["https://app.example.com".to_string()];
        cors.allow_credentials = true;
        let _ = create_cors_layer(&cors);

        cors.allowed_origins = vec!["*".to_string()];
        let _ = create_cors_layer(&cors);
    }
}
