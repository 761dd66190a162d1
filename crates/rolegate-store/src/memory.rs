// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store for tests and development.
//!
//! Implements both [`ProfileStore`] and [`RoleCatalog`] over a single
//! `parking_lot::RwLock`, so every operation (including the uniqueness checks
//! behind `insert_profile` and `add_membership`) is atomic with respect to
//! concurrent callers. The lock is never held across an `.await`.
//!
//! Data is lost when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rolegate_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let provisioner = ProfileProvisioner::new(store.clone(), store.clone());
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use rolegate_core::error::{StoreError, StoreResult};
use rolegate_core::store::{ProfileStore, RoleCatalog};
use rolegate_core::types::{Page, Profile, ProfileId, ProfileUpdate, Role, RoleId, RoleName};

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<ProfileId, Profile>,
    /// Non-empty email -> owning profile.
    emails: HashMap<String, ProfileId>,
    roles: HashMap<RoleId, Role>,
    role_names: HashMap<RoleName, RoleId>,
    memberships: BTreeSet<(ProfileId, RoleId)>,
    /// Insertion sequence, keeps listing order stable for equal timestamps.
    sequence: HashMap<ProfileId, u64>,
}

/// Thread-safe in-memory profile and role store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    inserts: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub fn profile_count(&self) -> usize {
        self.tables.read().profiles.len()
    }

    /// Number of stored memberships.
    pub fn membership_count(&self) -> usize {
        self.tables.read().memberships.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, id: &ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().profiles.get(id).cloned())
    }

    async fn insert_profile(&self, profile: Profile) -> StoreResult<Profile> {
        let mut tables = self.tables.write();

        if tables.profiles.contains_key(&profile.id) {
            return Err(StoreError::duplicate("profile", profile.id.as_str()));
        }
        if !profile.email.is_empty() && tables.emails.contains_key(&profile.email) {
            return Err(StoreError::duplicate("email", profile.email.as_str()));
        }

        if !profile.email.is_empty() {
            tables.emails.insert(profile.email.clone(), profile.id.clone());
        }
        let seq = self.inserts.fetch_add(1, Ordering::Relaxed);
        tables.sequence.insert(profile.id.clone(), seq);
        tables.profiles.insert(profile.id.clone(), profile.clone());

        debug!(profile_id = %profile.id, "Inserted profile");
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        let mut tables = self.tables.write();
        let profile = tables
            .profiles
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("profile", id.as_str()))?;
        update.apply_to(profile, now);
        Ok(profile.clone())
    }

    async fn list_profiles(&self, page: Page) -> StoreResult<Vec<Profile>> {
        let tables = self.tables.read();

        let mut profiles: Vec<&Profile> = tables.profiles.values().collect();
        profiles.sort_by_key(|p| {
            let seq = tables.sequence.get(&p.id).copied().unwrap_or(u64::MAX);
            (p.created_at, seq)
        });

        Ok(profiles
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl RoleCatalog for MemoryStore {
    async fn role_by_name(&self, name: &RoleName) -> StoreResult<Option<Role>> {
        let tables = self.tables.read();
        Ok(tables
            .role_names
            .get(name)
            .and_then(|id| tables.roles.get(id))
            .cloned())
    }

    async fn insert_role(&self, role: Role) -> StoreResult<Role> {
        let mut tables = self.tables.write();
        if tables.role_names.contains_key(&role.name) {
            return Err(StoreError::duplicate("role", role.name.as_str()));
        }
        tables.role_names.insert(role.name.clone(), role.id);
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read();
        let mut roles: Vec<Role> = tables.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn memberships_of(&self, profile: &ProfileId) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read();
        let first = (profile.clone(), RoleId::from_uuid(Uuid::nil()));
        Ok(tables
            .memberships
            .range(first..)
            .take_while(|(p, _)| p == profile)
            .filter_map(|(_, role)| tables.roles.get(role).cloned())
            .collect())
    }

    async fn add_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        if !tables.profiles.contains_key(profile) {
            return Err(StoreError::not_found("profile", profile.as_str()));
        }
        if !tables.roles.contains_key(role) {
            return Err(StoreError::not_found("role", role.to_string()));
        }
        Ok(tables.memberships.insert((profile.clone(), *role)))
    }

    async fn remove_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        Ok(tables.memberships.remove(&(profile.clone(), *role)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, email: &str) -> Profile {
        Profile::new(ProfileId::new(id), email, Utc::now())
    }

    fn role(name: &str) -> Role {
        Role::new(RoleName::parse(name).unwrap(), None)
    }

    #[tokio::test]
    async fn test_insert_and_get_profile() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "a@x.io")).await.unwrap();

        let found = store.get_profile(&ProfileId::new("u1")).await.unwrap();
        assert_eq!(found.unwrap().email, "a@x.io");
        assert!(store.get_profile(&ProfileId::new("u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_profile_id() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "a@x.io")).await.unwrap();
        let err = store.insert_profile(profile("u1", "b@x.io")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "a@x.io")).await.unwrap();
        let err = store.insert_profile(profile("u2", "a@x.io")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_emails_not_unique() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "")).await.unwrap();
        store.insert_profile(profile("u2", "")).await.unwrap();
        assert_eq!(store.profile_count(), 2);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "a@x.io")).await.unwrap();

        let update = ProfileUpdate {
            bio: Some("hello".into()),
            ..Default::default()
        };
        let updated = store
            .update_profile(&ProfileId::new("u1"), &update, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert!(updated.updated_at.is_some());

        let err = store
            .update_profile(&ProfileId::new("nobody"), &update, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_profiles_paged() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert_profile(profile(&format!("u{i}"), "")).await.unwrap();
        }
        let page = store.list_profiles(Page::new(1, 2).unwrap()).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id.as_str(), "u1");
        assert_eq!(page[1].id.as_str(), "u2");
    }

    #[tokio::test]
    async fn test_role_uniqueness() {
        let store = MemoryStore::new();
        store.insert_role(role("admin")).await.unwrap();
        let err = store.insert_role(role("admin")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_membership_set_semantics() {
        let store = MemoryStore::new();
        store.insert_profile(profile("u1", "")).await.unwrap();
        let admin = store.insert_role(role("admin")).await.unwrap();
        let id = ProfileId::new("u1");

        assert!(store.add_membership(&id, &admin.id).await.unwrap());
        assert!(!store.add_membership(&id, &admin.id).await.unwrap());
        assert_eq!(store.memberships_of(&id).await.unwrap().len(), 1);

        assert!(store.remove_membership(&id, &admin.id).await.unwrap());
        assert!(!store.remove_membership(&id, &admin.id).await.unwrap());
        assert!(store.memberships_of(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memberships_of_is_per_profile() {
        let store = MemoryStore::new();
        let admin = store.insert_role(role("admin")).await.unwrap();
        let user = store.insert_role(role("user")).await.unwrap();
        for id in ["a", "b", "c"] {
            store.insert_profile(profile(id, "")).await.unwrap();
        }
        let (a, b, c) = (ProfileId::new("a"), ProfileId::new("b"), ProfileId::new("c"));
        store.add_membership(&a, &user.id).await.unwrap();
        store.add_membership(&b, &admin.id).await.unwrap();
        store.add_membership(&b, &user.id).await.unwrap();
        store.add_membership(&c, &admin.id).await.unwrap();

        let names = |roles: Vec<Role>| {
            let mut names: Vec<String> = roles.into_iter().map(|r| r.name.to_string()).collect();
            names.sort();
            names
        };
        assert_eq!(names(store.memberships_of(&a).await.unwrap()), ["user"]);
        assert_eq!(names(store.memberships_of(&b).await.unwrap()), ["admin", "user"]);
        assert_eq!(names(store.memberships_of(&c).await.unwrap()), ["admin"]);
        assert!(store
            .memberships_of(&ProfileId::new("d"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_membership_requires_profile() {
        let store = MemoryStore::new();
        let admin = store.insert_role(role("admin")).await.unwrap();
        let err = store
            .add_membership(&ProfileId::new("ghost"), &admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.membership_count(), 0);
    }
}
