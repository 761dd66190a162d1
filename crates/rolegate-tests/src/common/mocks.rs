// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Store wrappers with switchable failure injection and call counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rolegate_core::{
    Page, Profile, ProfileId, ProfileStore, ProfileUpdate, Role, RoleCatalog, RoleId, RoleName,
    StoreError, StoreResult,
};
use rolegate_store::MemoryStore;

// =============================================================================
// FailingStore
// =============================================================================

/// A [`MemoryStore`] whose operations can be made to fail on demand.
///
/// Reads, writes and membership changes are switched independently, so a
/// test can let provisioning succeed while the baseline-role attach fails.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_memberships: AtomicBool,
    stale_reads: AtomicU64,
    profile_inserts: AtomicU64,
    membership_adds: AtomicU64,
}

impl FailingStore {
    /// Creates a healthy store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Makes every read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes profile and role writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes membership changes fail.
    pub fn set_fail_memberships(&self, fail: bool) {
        self.fail_memberships.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `count` profile reads report nothing.
    ///
    /// Reproduces a request that looked the profile up just before a
    /// concurrent request committed it.
    pub fn miss_next_reads(&self, count: u64) {
        self.stale_reads.store(count, Ordering::SeqCst);
    }

    /// Fails everything.
    pub fn go_down(&self) {
        self.set_fail_reads(true);
        self.set_fail_writes(true);
        self.set_fail_memberships(true);
    }

    /// Number of `insert_profile` calls, including failed ones.
    pub fn profile_inserts(&self) -> u64 {
        self.profile_inserts.load(Ordering::SeqCst)
    }

    /// Number of `add_membership` calls, including failed ones.
    pub fn membership_adds(&self) -> u64 {
        self.membership_adds.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::unavailable(format!("injected failure: {}", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn get_profile(&self, id: &ProfileId) -> StoreResult<Option<Profile>> {
        Self::check(&self.fail_reads, "get_profile")?;
        let stale = self
            .stale_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(None);
        }
        self.inner.get_profile(id).await
    }

    async fn insert_profile(&self, profile: Profile) -> StoreResult<Profile> {
        self.profile_inserts.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "insert_profile")?;
        self.inner.insert_profile(profile).await
    }

    async fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        Self::check(&self.fail_writes, "update_profile")?;
        self.inner.update_profile(id, update, now).await
    }

    async fn list_profiles(&self, page: Page) -> StoreResult<Vec<Profile>> {
        Self::check(&self.fail_reads, "list_profiles")?;
        self.inner.list_profiles(page).await
    }

    async fn ping(&self) -> StoreResult<()> {
        Self::check(&self.fail_reads, "ping")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[async_trait]
impl RoleCatalog for FailingStore {
    async fn role_by_name(&self, name: &RoleName) -> StoreResult<Option<Role>> {
        Self::check(&self.fail_reads, "role_by_name")?;
        self.inner.role_by_name(name).await
    }

    async fn insert_role(&self, role: Role) -> StoreResult<Role> {
        Self::check(&self.fail_writes, "insert_role")?;
        self.inner.insert_role(role).await
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Self::check(&self.fail_reads, "list_roles")?;
        self.inner.list_roles().await
    }

    async fn memberships_of(&self, profile: &ProfileId) -> StoreResult<Vec<Role>> {
        Self::check(&self.fail_reads, "memberships_of")?;
        self.inner.memberships_of(profile).await
    }

    async fn add_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        self.membership_adds.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_memberships, "add_membership")?;
        self.inner.add_membership(profile, role).await
    }

    async fn remove_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        Self::check(&self.fail_memberships, "remove_membership")?;
        self.inner.remove_membership(profile, role).await
    }

    async fn ping(&self) -> StoreResult<()> {
        Self::check(&self.fail_reads, "catalog ping")
    }
}
