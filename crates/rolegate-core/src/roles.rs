// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request role loading.

use std::sync::Arc;

use tracing::{instrument, trace};

use crate::error::CoreResult;
use crate::store::RoleCatalog;
use crate::types::{ProfileId, RoleSet};

/// Loads the roles a profile currently holds.
///
/// Roles are read fresh on every call so that an assignment or removal is
/// visible to the next request.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    catalog: Arc<dyn RoleCatalog>,
}

impl RoleResolver {
    /// Creates a resolver over the given catalog.
    pub fn new(catalog: Arc<dyn RoleCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the profile's roles, empty when it holds none.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn load_roles(&self, id: &ProfileId) -> CoreResult<RoleSet> {
        let roles: RoleSet = self.catalog.memberships_of(id).await?.into_iter().collect();
        trace!(roles = ?roles.names(), "Loaded roles");
        Ok(roles)
    }
}
