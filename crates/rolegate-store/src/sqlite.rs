// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SQLite-backed store.
//!
//! Uniqueness and membership atomicity come from the schema: `profiles.id`
//! is the primary key, non-empty emails carry a partial unique index,
//! `roles.name` is unique and `profile_roles` has a composite primary key.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use rolegate_core::error::{StoreError, StoreResult};
use rolegate_core::store::{ProfileStore, RoleCatalog};
use rolegate_core::types::{Page, Profile, ProfileId, ProfileUpdate, Role, RoleId, RoleName};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id          TEXT PRIMARY KEY NOT NULL,
        email       TEXT NOT NULL DEFAULT '',
        first_name  TEXT,
        last_name   TEXT,
        avatar_url  TEXT,
        phone       TEXT,
        bio         TEXT,
        is_active   INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL,
        updated_at  TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_email
        ON profiles (email) WHERE email <> ''
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id          TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profile_roles (
        profile_id  TEXT NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        role_id     TEXT NOT NULL REFERENCES roles (id) ON DELETE CASCADE,
        PRIMARY KEY (profile_id, role_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_profile_roles_role ON profile_roles (role_id)
    "#,
];

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: ProfileId::new(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            avatar_url: row.avatar_url,
            phone: row.phone,
            bio: row.bio,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = StoreError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::unavailable_with(format!("corrupt role id '{}'", row.id), e))?;
        let name = RoleName::parse(&row.name)
            .map_err(|e| StoreError::unavailable(format!("corrupt role name: {}", e)))?;
        Ok(Role {
            id: RoleId::from_uuid(id),
            name,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, avatar_url, phone, bio, \
                               is_active, created_at, updated_at";

// =============================================================================
// Error mapping
// =============================================================================

fn unavailable(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::unavailable_with(context, e)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

// =============================================================================
// SqliteStore
// =============================================================================

/// Profile and role store over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) a database file.
    pub async fn open(path: &Path, max_connections: u32) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::unavailable_with(
                        format!("creating database directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(unavailable("connecting to database"))?;

        info!(path = %path.display(), "Opened SQLite store");
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(unavailable("parsing in-memory database URL"))?
            .foreign_keys(true);

        // A single long-lived connection; each new one would be a fresh database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(unavailable("connecting to in-memory database"))?;

        Self::with_pool(pool).await
    }

    /// Wraps an existing pool and creates missing tables.
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(unavailable("creating schema"))?;
        }
        Ok(())
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get_profile(&self, id: &ProfileId) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("fetching profile"))?;

        Ok(row.map(Profile::from))
    }

    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    async fn insert_profile(&self, profile: Profile) -> StoreResult<Profile> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, first_name, last_name, avatar_url, phone, bio,
                                  is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .bind(&profile.phone)
        .bind(&profile.bio)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Inserted profile");
                Ok(profile)
            }
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::duplicate("profile", profile.id.into_inner()))
            }
            Err(e) => Err(StoreError::unavailable_with("inserting profile", e)),
        }
    }

    #[instrument(skip(self, update))]
    async fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Profile> {
        if !update.is_empty() {
            let result = sqlx::query(
                r#"
                UPDATE profiles SET
                    first_name = COALESCE(?, first_name),
                    last_name  = COALESCE(?, last_name),
                    avatar_url = COALESCE(?, avatar_url),
                    phone      = COALESCE(?, phone),
                    bio        = COALESCE(?, bio),
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.avatar_url)
            .bind(&update.phone)
            .bind(&update.bio)
            .bind(now)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(unavailable("updating profile"))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("profile", id.as_str()));
            }
        }

        self.get_profile(id)
            .await?
            .ok_or_else(|| StoreError::not_found("profile", id.as_str()))
    }

    #[instrument(skip(self))]
    async fn list_profiles(&self, page: Page) -> StoreResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at, rowid LIMIT ? OFFSET ?"
        ))
        .bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("listing profiles"))?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1 FROM profiles LIMIT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable("pinging profiles"))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[async_trait]
impl RoleCatalog for SqliteStore {
    #[instrument(skip(self))]
    async fn role_by_name(&self, name: &RoleName) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, description, created_at FROM roles WHERE name = ?",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("fetching role"))?;

        row.map(Role::try_from).transpose()
    }

    #[instrument(skip(self, role), fields(role = %role.name))]
    async fn insert_role(&self, role: Role) -> StoreResult<Role> {
        let result = sqlx::query(
            "INSERT INTO roles (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(role.id.to_string())
        .bind(role.name.as_str())
        .bind(&role.description)
        .bind(role.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(role),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::duplicate("role", role.name.as_str()))
            }
            Err(e) => Err(StoreError::unavailable_with("inserting role", e)),
        }
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, description, created_at FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("listing roles"))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn memberships_of(&self, profile: &ProfileId) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.description, r.created_at
            FROM roles r
            JOIN profile_roles pr ON pr.role_id = r.id
            WHERE pr.profile_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(profile.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("loading memberships"))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn add_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO profile_roles (profile_id, role_id) VALUES (?, ?)",
        )
        .bind(profile.as_str())
        .bind(role.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::not_found(
                "membership target",
                format!("{}/{}", profile, role),
            )),
            Err(e) => Err(StoreError::unavailable_with("adding membership", e)),
        }
    }

    #[instrument(skip(self))]
    async fn remove_membership(&self, profile: &ProfileId, role: &RoleId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM profile_roles WHERE profile_id = ? AND role_id = ?")
            .bind(profile.as_str())
            .bind(role.to_string())
            .execute(&self.pool)
            .await
            .map_err(unavailable("removing membership"))?;

        Ok(done.rows_affected() == 1)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1 FROM roles LIMIT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable("pinging role catalog"))?;
        Ok(())
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
        Role::new(RoleName::parse(name).unwrap(), Some(format!("{name} role")))
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store.insert_profile(profile("u1", "a@x.io")).await.unwrap();

        let loaded = store.get_profile(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, "a@x.io");
        assert!(loaded.is_active);
        assert!(loaded.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_profile(profile("u1", "a@x.io")).await.unwrap();

        assert!(store.insert_profile(profile("u1", "")).await.unwrap_err().is_duplicate());
        assert!(store.insert_profile(profile("u2", "a@x.io")).await.unwrap_err().is_duplicate());

        // Empty emails are exempt from uniqueness.
        store.insert_profile(profile("u3", "")).await.unwrap();
        store.insert_profile(profile("u4", "")).await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut p = profile("u1", "");
        p.last_name = Some("Lovelace".into());
        store.insert_profile(p).await.unwrap();

        let update = ProfileUpdate {
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        let updated = store
            .update_profile(&ProfileId::new("u1"), &update, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));
        assert_eq!(updated.last_name.as_deref(), Some("Lovelace"));
        assert!(updated.updated_at.is_some());

        let missing = store
            .update_profile(&ProfileId::new("ghost"), &update, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_roles_and_memberships() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_profile(profile("u1", "")).await.unwrap();
        let admin = store.insert_role(role("admin")).await.unwrap();
        store.insert_role(role("user")).await.unwrap();
        assert!(store.insert_role(role("admin")).await.unwrap_err().is_duplicate());

        let found = store.role_by_name(&RoleName::admin()).await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert_eq!(store.list_roles().await.unwrap().len(), 2);

        let id = ProfileId::new("u1");
        assert!(store.add_membership(&id, &admin.id).await.unwrap());
        assert!(!store.add_membership(&id, &admin.id).await.unwrap());

        let held = store.memberships_of(&id).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].name.as_str(), "admin");

        assert!(store.remove_membership(&id, &admin.id).await.unwrap());
        assert!(!store.remove_membership(&id, &admin.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_membership_unknown_profile() {
        let store = SqliteStore::in_memory().await.unwrap();
        let admin = store.insert_role(role("admin")).await.unwrap();
        let err = store
            .add_membership(&ProfileId::new("ghost"), &admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rolegate.db");
        {
            let store = SqliteStore::open(&path, 2).await.unwrap();
            store.insert_profile(profile("u1", "a@x.io")).await.unwrap();
            store.pool().close().await;
        }
        let store = SqliteStore::open(&path, 2).await.unwrap();
        assert!(store.get_profile(&ProfileId::new("u1")).await.unwrap().is_some());
        ProfileStore::ping(&store).await.unwrap();
        RoleCatalog::ping(&store).await.unwrap();
    }
}
