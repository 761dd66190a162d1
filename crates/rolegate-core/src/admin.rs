// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role administration.
//!
//! Every caller-facing operation takes the acting [`Principal`] and checks
//! the admin guard before touching the stores, so a denied call never reads
//! or writes anything. Membership changes rely on the catalog's atomic
//! add/remove result instead of a separate existence check.
//!
//! System operations (`ensure_roles`, `grant_system`) skip the guard and are
//! meant for startup seeding only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{ConflictKind, CoreError, CoreResult};
use crate::guard::RoleGuard;
use crate::store::{ProfileStore, RoleCatalog};
use crate::types::{Principal, ProfileId, Role, RoleName, RoleSet};

/// A role to seed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name.
    pub name: RoleName,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl RoleDefinition {
    /// Creates a role definition.
    pub fn new(name: RoleName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: Some(description.into()),
        }
    }

    /// The `admin`, `user` and `moderator` roles.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(RoleName::admin(), "Administrator with full access"),
            Self::new(RoleName::user(), "Regular user with basic access"),
            Self::new(RoleName::moderator(), "Moderator with elevated permissions"),
        ]
    }
}

/// Privileged management of roles and memberships.
#[derive(Debug, Clone)]
pub struct RoleAdministration {
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<dyn RoleCatalog>,
    guard: RoleGuard,
}

impl RoleAdministration {
    /// Creates the service guarded by the admin role.
    pub fn new(profiles: Arc<dyn ProfileStore>, catalog: Arc<dyn RoleCatalog>) -> Self {
        Self {
            profiles,
            catalog,
            guard: RoleGuard::admin(),
        }
    }

    fn authorize(&self, actor: &Principal) -> CoreResult<()> {
        self.guard.authorize(&actor.roles)
    }

    /// Creates a role.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Invalid` for a bad name, `Conflict(AlreadyExists)` for
    /// a taken name.
    #[instrument(skip(self, actor, description), fields(actor = %actor.id()))]
    pub async fn create_role(
        &self,
        actor: &Principal,
        name: &str,
        description: Option<String>,
    ) -> CoreResult<Role> {
        self.authorize(actor)?;
        let name = RoleName::parse(name)?;

        match self.catalog.insert_role(Role::new(name.clone(), description)).await {
            Ok(role) => {
                info!(role = %role.name, "Role created");
                Ok(role)
            }
            Err(e) if e.is_duplicate() => Err(CoreError::conflict(
                ConflictKind::AlreadyExists,
                format!("Role '{}' already exists", name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every role.
    pub async fn list_roles(&self, actor: &Principal) -> CoreResult<Vec<Role>> {
        self.authorize(actor)?;
        Ok(self.catalog.list_roles().await?)
    }

    /// Returns the roles held by another profile.
    pub async fn roles_of(&self, actor: &Principal, profile: &ProfileId) -> CoreResult<RoleSet> {
        self.authorize(actor)?;
        self.require_profile(profile).await?;
        Ok(self.catalog.memberships_of(profile).await?.into_iter().collect())
    }

    /// Grants a role to a profile.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `NotFound` for an unknown profile or role,
    /// `Conflict(AlreadyAssigned)` if the profile already holds it.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn assign(&self, actor: &Principal, profile: &ProfileId, role: &str) -> CoreResult<()> {
        self.authorize(actor)?;
        let role = self.require_role(role).await?;
        self.require_profile(profile).await?;

        if !self.catalog.add_membership(profile, &role.id).await? {
            return Err(CoreError::conflict(
                ConflictKind::AlreadyAssigned,
                format!("Profile '{}' already has role '{}'", profile, role.name),
            ));
        }
        info!(profile_id = %profile, role = %role.name, "Role assigned");
        Ok(())
    }

    /// Revokes a role from a profile.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `NotFound` for an unknown profile or role,
    /// `Conflict(NotAssigned)` if the profile does not hold it.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn unassign(
        &self,
        actor: &Principal,
        profile: &ProfileId,
        role: &str,
    ) -> CoreResult<()> {
        self.authorize(actor)?;
        let role = self.require_role(role).await?;
        self.require_profile(profile).await?;

        if !self.catalog.remove_membership(profile, &role.id).await? {
            return Err(CoreError::conflict(
                ConflictKind::NotAssigned,
                format!("Profile '{}' does not have role '{}'", profile, role.name),
            ));
        }
        info!(profile_id = %profile, role = %role.name, "Role removed");
        Ok(())
    }

    /// Creates any missing roles from `definitions`; returns how many were created.
    ///
    /// Existing roles are left as they are.
    pub async fn ensure_roles(&self, definitions: &[RoleDefinition]) -> CoreResult<usize> {
        let mut created = 0;
        for def in definitions {
            if self.catalog.role_by_name(&def.name).await?.is_some() {
                debug!(role = %def.name, "Role already present");
                continue;
            }
            match self
                .catalog
                .insert_role(Role::new(def.name.clone(), def.description.clone()))
                .await
            {
                Ok(_) => created += 1,
                Err(e) if e.is_duplicate() => {}
                Err(e) => return Err(e.into()),
            }
        }
        if created > 0 {
            info!(created, "Seeded roles");
        }
        Ok(created)
    }

    /// Grants a role without an actor check.
    ///
    /// Returns `false` when the profile does not exist yet or already holds
    /// the role.
    pub async fn grant_system(&self, profile: &ProfileId, role: &RoleName) -> CoreResult<bool> {
        if self.profiles.get_profile(profile).await?.is_none() {
            return Ok(false);
        }
        let role = self
            .catalog
            .role_by_name(role)
            .await?
            .ok_or_else(|| CoreError::not_found("role", role.as_str()))?;
        Ok(self.catalog.add_membership(profile, &role.id).await?)
    }

    async fn require_role(&self, name: &str) -> CoreResult<Role> {
        let name = RoleName::parse(name)?;
        self.catalog
            .role_by_name(&name)
            .await?
            .ok_or_else(|| CoreError::not_found("role", name.as_str()))
    }

    async fn require_profile(&self, id: &ProfileId) -> CoreResult<()> {
        match self.profiles.get_profile(id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::not_found("profile", id.as_str())),
        }
    }
}
