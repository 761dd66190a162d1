// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Profile reads and self-service updates.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::error::{CoreError, CoreResult};
use crate::guard::{GuardChain, RoleGuard};
use crate::store::ProfileStore;
use crate::types::{Page, Principal, Profile, ProfileId, ProfileUpdate};

/// Profile operations on behalf of an authenticated caller.
#[derive(Debug, Clone)]
pub struct ProfileDirectory {
    profiles: Arc<dyn ProfileStore>,
    admin: RoleGuard,
    self_update: GuardChain,
}

impl ProfileDirectory {
    /// Creates a directory over the given store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            profiles,
            admin: RoleGuard::admin(),
            self_update: GuardChain::authenticated().require_active(),
        }
    }

    /// Returns the caller's own profile.
    pub fn me<'a>(&self, principal: &'a Principal) -> &'a Profile {
        &principal.profile
    }

    /// Applies a partial update to the caller's own profile.
    ///
    /// Inactive profiles are rejected. An empty update returns the stored
    /// profile without touching `updated_at`.
    #[instrument(skip(self, principal, update), fields(profile_id = %principal.id()))]
    pub async fn update_me(
        &self,
        principal: &Principal,
        update: &ProfileUpdate,
    ) -> CoreResult<Profile> {
        self.self_update.evaluate(Some(principal))?;
        update.validate()?;

        if update.is_empty() {
            debug!("Empty profile update");
            return self
                .profiles
                .get_profile(principal.id())
                .await?
                .ok_or_else(|| CoreError::not_found("profile", principal.id().as_str()));
        }

        Ok(self
            .profiles
            .update_profile(principal.id(), update, Utc::now())
            .await?)
    }

    /// Lists profiles. Admin only.
    pub async fn list(&self, actor: &Principal, page: Page) -> CoreResult<Vec<Profile>> {
        self.admin.authorize(&actor.roles)?;
        Ok(self.profiles.list_profiles(page).await?)
    }

    /// Reads another profile. Admin only.
    pub async fn get(&self, actor: &Principal, id: &ProfileId) -> CoreResult<Profile> {
        self.admin.authorize(&actor.roles)?;
        self.profiles
            .get_profile(id)
            .await?
            .ok_or_else(|| CoreError::not_found("profile", id.as_str()))
    }
}
