// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for rolegate.
//!
//! Identities are ephemeral and live for a single request. Profiles and
//! roles are durable records owned by the stores; the types here only carry
//! them between layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Name of the privileged administration role.
pub const ADMIN_ROLE: &str = "admin";

/// Name of the baseline role attached on first contact.
pub const USER_ROLE: &str = "user";

/// Name of the moderation role seeded by default.
pub const MODERATOR_ROLE: &str = "moderator";

/// Maximum length of a role name.
pub const MAX_ROLE_NAME_LEN: usize = 50;

// =============================================================================
// Identifiers
// =============================================================================

/// Stable identifier of a profile.
///
/// The value is the subject claim issued by the identity provider, so it is
/// treated as an opaque string.
///
/// # Examples
///
/// ```
/// use rolegate_core::types::ProfileId;
///
/// let id = ProfileId::new("5d1f0c7e-user");
/// assert_eq!(id.as_str(), "5d1f0c7e-user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a new profile ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Generates a new time-ordered role ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[inline]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::invalid("role_id", e.to_string()))
    }
}

/// A validated role name.
///
/// Names are trimmed, non-empty, at most [`MAX_ROLE_NAME_LEN`] characters and
/// limited to ASCII alphanumerics plus `_ - . :`. Comparison is
/// case-sensitive.
///
/// # Examples
///
/// ```
/// use rolegate_core::types::RoleName;
///
/// let name = RoleName::parse(" editor ").unwrap();
/// assert_eq!(name.as_str(), "editor");
/// assert!(RoleName::parse("").is_err());
/// assert!(RoleName::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Parses and validates a role name.
    pub fn parse(name: &str) -> CoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid("name", "Role name must not be empty"));
        }
        if name.chars().count() > MAX_ROLE_NAME_LEN {
            return Err(CoreError::invalid(
                "name",
                format!("Role name must be at most {} characters", MAX_ROLE_NAME_LEN),
            ));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
        {
            return Err(CoreError::invalid(
                "name",
                format!("Role name contains invalid character '{}'", c),
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// The `admin` role name.
    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_string())
    }

    /// The `user` role name.
    pub fn user() -> Self {
        Self(USER_ROLE.to_string())
    }

    /// The `moderator` role name.
    pub fn moderator() -> Self {
        Self(MODERATOR_ROLE.to_string())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoleName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleName> for String {
    fn from(name: RoleName) -> Self {
        name.0
    }
}

impl FromStr for RoleName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The caller as asserted by a verified token.
///
/// Not persisted. `role_hint` comes from the token and is display-only;
/// authorization always uses roles loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject of the token.
    pub id: ProfileId,
    /// Email claim, empty when the token carries none.
    pub email: String,
    /// Role advertised by the identity provider.
    pub role_hint: String,
}

impl Identity {
    /// Creates an identity with the default role hint.
    pub fn new(id: impl Into<ProfileId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role_hint: USER_ROLE.to_string(),
        }
    }

    /// Sets the role hint.
    pub fn with_role_hint(mut self, hint: impl Into<String>) -> Self {
        self.role_hint = hint.into();
        self
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Durable per-identity profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the owning identity's subject.
    pub id: ProfileId,
    /// Contact email; unique among non-empty values.
    pub email: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Avatar location.
    pub avatar_url: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Whether the profile may perform mutating operations.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last partial update, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Creates a fresh active profile for first contact.
    pub fn new(id: ProfileId, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: None,
            last_name: None,
            avatar_url: None,
            phone: None,
            bio: None,
            is_active: true,
            created_at: now,
            updated_at: None,
        }
    }

    /// Builder-style setter for `is_active`.
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

/// Field length limits applied to [`ProfileUpdate`].
const MAX_NAME_LEN: usize = 100;
const MAX_AVATAR_URL_LEN: usize = 2048;
const MAX_BIO_LEN: usize = 4096;

/// Partial update of a profile.
///
/// `None` leaves a field untouched. Identity-bound fields (`id`, `email`,
/// `is_active`, timestamps) cannot be changed through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    /// New given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New avatar location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// New phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.avatar_url.is_none()
            && self.phone.is_none()
            && self.bio.is_none()
    }

    /// Checks field lengths.
    pub fn validate(&self) -> CoreResult<()> {
        let checks = [
            ("first_name", &self.first_name, MAX_NAME_LEN),
            ("last_name", &self.last_name, MAX_NAME_LEN),
            ("phone", &self.phone, MAX_NAME_LEN),
            ("avatar_url", &self.avatar_url, MAX_AVATAR_URL_LEN),
            ("bio", &self.bio, MAX_BIO_LEN),
        ];
        for (field, value, max) in checks {
            if let Some(v) = value {
                if v.chars().count() > max {
                    return Err(CoreError::invalid(
                        field,
                        format!("must be at most {} characters", max),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Applies the set fields onto `profile` and stamps `updated_at`.
    ///
    /// Does nothing when the update is empty.
    pub fn apply_to(&self, profile: &mut Profile, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(v) = &self.first_name {
            profile.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            profile.last_name = Some(v.clone());
        }
        if let Some(v) = &self.avatar_url {
            profile.avatar_url = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            profile.phone = Some(v.clone());
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        profile.updated_at = Some(now);
    }
}

// =============================================================================
// Roles
// =============================================================================

/// A named role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Unique name.
    pub name: RoleName,
    /// Optional description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new role record with a fresh ID.
    pub fn new(name: RoleName, description: Option<String>) -> Self {
        Self {
            id: RoleId::generate(),
            name,
            description,
            created_at: Utc::now(),
        }
    }
}

/// The roles held by a profile, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: BTreeMap<RoleName, Role>,
}

impl RoleSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role; returns `false` if a role with that name was present.
    pub fn insert(&mut self, role: Role) -> bool {
        self.roles.insert(role.name.clone(), role).is_none()
    }

    /// Returns `true` if a role with this name is held.
    pub fn contains(&self, name: &str) -> bool {
        self.roles.keys().any(|n| n.as_str() == name)
    }

    /// Returns the held role names in order.
    pub fn names(&self) -> Vec<&str> {
        self.roles.keys().map(RoleName::as_str).collect()
    }

    /// Iterates over the held roles.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Number of roles held.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no role is held.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl IntoIterator for RoleSet {
    type Item = Role;
    type IntoIter = std::collections::btree_map::IntoValues<RoleName, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.into_values()
    }
}

// =============================================================================
// Principal
// =============================================================================

/// An authenticated caller: the profile plus the roles loaded for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The caller's profile.
    pub profile: Profile,
    /// Roles loaded from the catalog.
    pub roles: RoleSet,
    /// Role hint carried by the token.
    pub role_hint: String,
}

impl Principal {
    /// Creates a principal.
    pub fn new(profile: Profile, roles: RoleSet) -> Self {
        Self {
            profile,
            roles,
            role_hint: USER_ROLE.to_string(),
        }
    }

    /// Sets the token role hint.
    pub fn with_role_hint(mut self, hint: impl Into<String>) -> Self {
        self.role_hint = hint.into();
        self
    }

    /// Returns the profile ID.
    pub fn id(&self) -> &ProfileId {
        &self.profile.id
    }

    /// Returns `true` if the named role is held.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }

    /// Returns `true` if any of the named roles is held.
    pub fn has_any_role(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has_role(n))
    }

    /// Returns `true` if every named role is held.
    pub fn has_all_roles(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_role(n))
    }

    /// Returns `true` if the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Default and maximum page size for listings.
pub const MAX_PAGE_SIZE: usize = 100;

/// Offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl Page {
    /// Creates a page, capping `limit` at [`MAX_PAGE_SIZE`].
    ///
    /// A zero limit is rejected.
    pub fn new(offset: usize, limit: usize) -> CoreResult<Self> {
        if limit == 0 {
            return Err(CoreError::invalid("limit", "must be greater than zero"));
        }
        Ok(Self {
            offset,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        Role::new(RoleName::parse(name).unwrap(), None)
    }

    #[test]
    fn test_profile_id() {
        let id = ProfileId::new("u1");
        assert_eq!(id.as_str(), "u1");
        assert_eq!(id.to_string(), "u1");
        assert_eq!(ProfileId::from("u1"), id);
    }

    #[test]
    fn test_role_name_validation() {
        assert_eq!(RoleName::parse("admin").unwrap().as_str(), "admin");
        assert_eq!(RoleName::parse("  team:lead ").unwrap().as_str(), "team:lead");
        assert!(RoleName::parse("   ").is_err());
        assert!(RoleName::parse("white space").is_err());
        assert!(RoleName::parse(&"x".repeat(MAX_ROLE_NAME_LEN)).is_ok());
        assert!(RoleName::parse(&"x".repeat(MAX_ROLE_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_role_name_serde() {
        let name: RoleName = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(name.as_str(), "editor");
        assert!(serde_json::from_str::<RoleName>("\"\"").is_err());
    }

    #[test]
    fn test_role_id_parse() {
        let id = RoleId::generate();
        let parsed: RoleId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<RoleId>().is_err());
    }

    #[test]
    fn test_new_profile_is_active() {
        let profile = Profile::new(ProfileId::new("u1"), "a@x.io", Utc::now());
        assert!(profile.is_active);
        assert!(profile.first_name.is_none());
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn test_profile_update_apply() {
        let mut profile = Profile::new(ProfileId::new("u1"), "a@x.io", Utc::now());
        profile.last_name = Some("Keep".into());

        let update = ProfileUpdate {
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        update.apply_to(&mut profile, Utc::now());

        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name.as_deref(), Some("Keep"));
        assert!(profile.updated_at.is_some());
    }

    #[test]
    fn test_empty_update_leaves_timestamp() {
        let mut profile = Profile::new(ProfileId::new("u1"), "", Utc::now());
        ProfileUpdate::default().apply_to(&mut profile, Utc::now());
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn test_profile_update_validate() {
        let update = ProfileUpdate {
            bio: Some("b".repeat(MAX_BIO_LEN + 1)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(ProfileUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_profile_update_rejects_unknown_fields() {
        let res = serde_json::from_str::<ProfileUpdate>(r#"{"email":"x@y.z"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_role_set() {
        let set: RoleSet = vec![role("user"), role("admin"), role("user")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["admin", "user"]);
        assert!(set.contains("admin"));
        assert!(!set.contains("Admin"));
    }

    #[test]
    fn test_principal_roles() {
        let profile = Profile::new(ProfileId::new("u1"), "", Utc::now());
        let principal = Principal::new(profile, vec![role("user")].into_iter().collect());
        assert!(principal.has_role("user"));
        assert!(!principal.is_admin());
        assert!(principal.has_any_role(&["admin", "user"]));
        assert!(!principal.has_all_roles(&["admin", "user"]));
    }

    #[test]
    fn test_page() {
        assert_eq!(Page::new(5, 500).unwrap().limit, MAX_PAGE_SIZE);
        assert!(Page::new(0, 0).is_err());
        assert_eq!(Page::default().limit, 100);
    }
}
