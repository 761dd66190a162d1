// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Lazy profile provisioning on first contact.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::error::{ConflictKind, CoreError, CoreResult, StoreError};
use crate::store::{ProfileStore, RoleCatalog};
use crate::types::{Identity, Profile, ProfileId, RoleName};

/// Outcome of [`ProfileProvisioner::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// The stored profile.
    pub profile: Profile,
    /// `true` if this call created it.
    pub created: bool,
}

/// Ensures a profile exists for every authenticated identity.
///
/// Concurrent first contact for one identity is settled by the store's
/// uniqueness constraint: the losing insert re-reads the winner's row.
#[derive(Debug, Clone)]
pub struct ProfileProvisioner {
    profiles: Arc<dyn ProfileStore>,
    roles: Arc<dyn RoleCatalog>,
    baseline_role: Option<RoleName>,
    bootstrap_admins: Arc<HashSet<ProfileId>>,
}

impl ProfileProvisioner {
    /// Creates a provisioner attaching the `user` role to new profiles.
    pub fn new(profiles: Arc<dyn ProfileStore>, roles: Arc<dyn RoleCatalog>) -> Self {
        Self {
            profiles,
            roles,
            baseline_role: Some(RoleName::user()),
            bootstrap_admins: Arc::new(HashSet::new()),
        }
    }

    /// Sets the role attached on creation; `None` disables it.
    pub fn with_baseline_role(mut self, role: Option<RoleName>) -> Self {
        self.baseline_role = role;
        self
    }

    /// Profiles that also receive the admin role when first created.
    pub fn with_bootstrap_admins(mut self, ids: impl IntoIterator<Item = ProfileId>) -> Self {
        self.bootstrap_admins = Arc::new(ids.into_iter().collect());
        self
    }

    /// Returns the existing profile or creates one.
    ///
    /// The new profile is committed before this returns. Role attachment on
    /// creation is best effort: a missing baseline role or a failed attach is
    /// logged and the request proceeds.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the store fails.
    /// - `Conflict(EmailTaken)` if the email belongs to a different profile.
    #[instrument(skip(self, identity), fields(profile_id = %identity.id))]
    pub async fn get_or_create(&self, identity: &Identity) -> CoreResult<Provisioned> {
        if let Some(profile) = self.profiles.get_profile(&identity.id).await? {
            return Ok(Provisioned {
                profile,
                created: false,
            });
        }

        let candidate = Profile::new(identity.id.clone(), identity.email.clone(), Utc::now());
        match self.profiles.insert_profile(candidate).await {
            Ok(profile) => {
                info!(email = %profile.email, "Provisioned new profile");
                self.attach_initial_roles(&profile.id).await;
                Ok(Provisioned {
                    profile,
                    created: true,
                })
            }
            Err(StoreError::DuplicateKey { .. }) => {
                debug!("Concurrent provisioning detected, re-reading profile");
                match self.profiles.get_profile(&identity.id).await? {
                    Some(profile) => Ok(Provisioned {
                        profile,
                        created: false,
                    }),
                    None => Err(CoreError::conflict(
                        ConflictKind::EmailTaken,
                        format!("Email '{}' is bound to another profile", identity.email),
                    )),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn attach_initial_roles(&self, id: &ProfileId) {
        if let Some(baseline) = &self.baseline_role {
            self.attach(id, baseline).await;
        }
        if self.bootstrap_admins.contains(id) {
            self.attach(id, &RoleName::admin()).await;
        }
    }

    async fn attach(&self, id: &ProfileId, name: &RoleName) {
        let role = match self.roles.role_by_name(name).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                debug!(role = %name, "Role not defined, skipping attach");
                return;
            }
            Err(e) => {
                warn!(role = %name, error = %e, "Failed to look up role for new profile");
                return;
            }
        };

        match self.roles.add_membership(id, &role.id).await {
            Ok(_) => debug!(role = %name, "Attached role to new profile"),
            Err(e) => warn!(role = %name, error = %e, "Failed to attach role to new profile"),
        }
    }
}
