// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence contracts.
//!
//! The access-control layer never talks to a database directly. It is handed
//! a [`ProfileStore`] and a [`RoleCatalog`] and relies on them for
//! atomicity:
//!
//! - **Profile uniqueness**: `insert_profile` fails with
//!   [`StoreError::DuplicateKey`] when the id (or a non-empty email) is taken.
//! - **Role uniqueness**: `insert_role` fails with `DuplicateKey` on a taken
//!   name.
//! - **Membership as a set**: `add_membership` and `remove_membership` report
//!   whether the set changed, so check-then-act races collapse into a single
//!   atomic operation.
//!
//! Every call is a suspension point and may fail with
//! [`StoreError::Unavailable`]; implementations never retry on their own.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{Page, Profile, ProfileId, ProfileUpdate, Role, RoleId, RoleName};

// =============================================================================
// ProfileStore
// =============================================================================

/// Durable store of profiles keyed by identity id.
#[async_trait]
pub trait ProfileStore: Send + Sync + Debug {
    /// Reads a profile.
    async fn get_profile(&self, id: &ProfileId) -> StoreResult<Option<Profile>>;

    /// Inserts a new profile.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when a profile with the same id, or another profile
    /// with the same non-empty email, already exists.
    async fn insert_profile(&self, profile: Profile) -> StoreResult<Profile>;

    /// Applies a partial update field by field and returns the stored result.
    ///
    /// Fields left `None` are not written, so concurrent updates of disjoint
    /// fields both survive. An empty update returns the profile unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound` when the profile does not exist.
    async fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile>;

    /// Lists profiles ordered by creation time.
    async fn list_profiles(&self, page: Page) -> StoreResult<Vec<Profile>>;

    /// Checks that the store can serve requests.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Returns the backend name.
    fn name(&self) -> &str;
}

// =============================================================================
// RoleCatalog
// =============================================================================

/// Durable store of roles and profile/role memberships.
#[async_trait]
pub trait RoleCatalog: Send + Sync + Debug {
    /// Looks a role up by name.
    async fn role_by_name(&self, name: &RoleName) -> StoreResult<Option<Role>>;

    /// Inserts a new role.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when the name is taken.
    async fn insert_role(&self, role: Role) -> StoreResult<Role>;

    /// Lists every role ordered by name.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Returns the roles held by a profile.
    async fn memberships_of(&self, profile: &ProfileId) -> StoreResult<Vec<Role>>;

    /// Adds a membership; returns `false` if it already existed.
    async fn add_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool>;

    /// Removes a membership; returns `false` if it did not exist.
    async fn remove_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool>;

    /// Checks that the catalog can serve requests.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
