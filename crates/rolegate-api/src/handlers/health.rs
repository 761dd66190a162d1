// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Liveness check. Returns 200 OK if the process is serving.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Readiness check. Pings the profile store and the role catalog.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let checks = [
        ("profile_store", state.profiles.ping().await),
        ("role_catalog", state.catalog.ping().await),
    ];

    let components: Vec<ComponentStatus> = checks
        .into_iter()
        .map(|(name, result)| ComponentStatus {
            name: name.to_string(),
            healthy: result.is_ok(),
            message: result.err().map(|e| e.to_string()),
        })
        .collect();
    let ready = components.iter().all(|c| c.healthy);

    let status = if ready {
        StatusCode::OK
    } else {
        tracing::warn!("Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, components }))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rolegate_config::JwtAlgorithm;
    use rolegate_store::MemoryStore;

    use crate::auth::TokenVerifier;

    fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        AppState::builder()
            .verifier(Arc::new(
                TokenVerifier::new("test-secret-key-that-is-long-enough", JwtAlgorithm::HS256)
                    .unwrap(),
            ))
            .profiles(store.clone())
            .catalog(store)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let response = ready(State(test_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
