// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Profile and membership handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use rolegate_core::{ProfileId, ProfileUpdate};

use crate::error::ApiResult;
use crate::extractors::{Auth, Pagination, ValidatedJson};
use crate::response::{role_names, AckResponse, MeResponse, PageResponse, ProfileRolesResponse};
use crate::state::AppState;

// =============================================================================
// Current Profile
// =============================================================================

/// GET /api/v1/users/me
///
/// Returns the caller's profile, roles and token role hint.
pub async fn current_user(Auth(principal): Auth) -> impl IntoResponse {
    Json(MeResponse::from_principal(principal))
}

/// PUT /api/v1/users/me
///
/// Partially updates the caller's profile. Inactive profiles get 403.
pub async fn update_current_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.directory.update_me(&principal, &update).await?;
    Ok(Json(MeResponse::with_profile(&principal, profile)))
}

// =============================================================================
// Profile Directory
// =============================================================================

/// GET /api/v1/users
///
/// Lists profiles in creation order. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Pagination(page): Pagination,
) -> ApiResult<impl IntoResponse> {
    let profiles = state.directory.list(&principal, page).await?;
    Ok(Json(PageResponse::new(profiles, page)))
}

/// GET /api/v1/users/{id}
///
/// Reads one profile. Admin only.
pub async fn get_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.directory.get(&principal, &ProfileId::new(id)).await?;
    Ok(Json(profile))
}

// =============================================================================
// Memberships
// =============================================================================

/// GET /api/v1/users/{id}/roles
///
/// Lists the roles a profile holds. Admin only.
pub async fn user_roles(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = ProfileId::new(id);
    let roles = state.admin.roles_of(&principal, &id).await?;
    Ok(Json(ProfileRolesResponse {
        profile_id: id.into_inner(),
        roles: role_names(&roles),
    }))
}

/// Body of a role assignment.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignRoleRequest {
    /// Role name to grant.
    pub role: String,
}

/// POST /api/v1/users/{id}/roles
///
/// Grants a role. 409 if the profile already holds it.
pub async fn assign_role(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AssignRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = ProfileId::new(id);
    state.admin.assign(&principal, &id, &request.role).await?;
    Ok(Json(AckResponse::new(format!(
        "Role '{}' assigned to '{}'",
        request.role.trim(),
        id
    ))))
}

/// DELETE /api/v1/users/{id}/roles/{role}
///
/// Revokes a role. 409 if the profile does not hold it.
pub async fn unassign_role(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path((id, role)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let id = ProfileId::new(id);
    state.admin.unassign(&principal, &id, &role).await?;
    Ok(Json(AckResponse::new(format!(
        "Role '{}' removed from '{}'",
        role.trim(),
        id
    ))))
}
