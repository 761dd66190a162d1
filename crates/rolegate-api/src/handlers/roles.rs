// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role catalog handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/roles
///
/// Lists every role. Admin only.
pub async fn list_roles(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> ApiResult<impl IntoResponse> {
    let roles = state.admin.list_roles(&principal).await?;
    Ok(Json(roles))
}

/// Body of a role creation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoleRequest {
    /// Unique role name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/v1/roles
///
/// Creates a role. 409 if the name is taken.
pub async fn create_role(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ValidatedJson(request): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let role = state
        .admin
        .create_role(&principal, &request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}
