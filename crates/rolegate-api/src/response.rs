// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use serde::{Deserialize, Serialize};

use rolegate_core::{Page, Principal, Profile, RoleSet};

// =============================================================================
// Profile Responses
// =============================================================================

/// The caller's profile with their authoritative roles.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// Profile fields.
    #[serde(flatten)]
    pub profile: Profile,
    /// Role names loaded from the catalog.
    pub roles: Vec<String>,
    /// Role advertised by the token. Display only.
    pub role_hint: String,
}

impl MeResponse {
    /// Builds the response for a principal.
    pub fn from_principal(principal: Principal) -> Self {
        let roles = role_names(&principal.roles);
        Self {
            profile: principal.profile,
            roles,
            role_hint: principal.role_hint,
        }
    }

    /// Builds the response for an updated profile.
    pub fn with_profile(principal: &Principal, profile: Profile) -> Self {
        Self {
            profile,
            roles: role_names(&principal.roles),
            role_hint: principal.role_hint.clone(),
        }
    }
}

/// Role names held by a profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileRolesResponse {
    /// Profile ID.
    pub profile_id: String,
    /// Role names, sorted.
    pub roles: Vec<String>,
}

/// One page of a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Offset requested.
    pub offset: usize,
    /// Page size applied.
    pub limit: usize,
}

impl<T> PageResponse<T> {
    /// Wraps items with the page that produced them.
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Self {
            items,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// Acknowledgement for membership changes.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl AckResponse {
    /// Creates an acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn role_names(roles: &RoleSet) -> Vec<String> {
    roles.names().into_iter().map(String::from).collect()
}

// =============================================================================
// Health Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rolegate_core::{ProfileId, Role, RoleName};

    #[test]
    fn test_me_response_shape() {
        let profile = Profile::new(ProfileId::new("u1"), "u1@x", Utc::now());
        let roles: RoleSet = [Role::new(RoleName::user(), None)].into_iter().collect();
        let principal = Principal::new(profile, roles).with_role_hint("admin");

        let json = serde_json::to_value(MeResponse::from_principal(principal)).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["is_active"], true);
        assert_eq!(json["roles"], serde_json::json!(["user"]));
        assert_eq!(json["role_hint"], "admin");
    }

    #[test]
    fn test_page_response() {
        let page = Page::new(10, 5).unwrap();
        let response = PageResponse::new(vec![1, 2], page);
        assert_eq!(response.offset, 10);
        assert_eq!(response.limit, 5);
    }
}
