/// User model and database operations
///
/// Platform-level identity records. A user authenticates either with a
/// password credential (provider `local`) or a Google identity (provider
/// `google`, `google_id` populated, `password_hash` empty). Accounts are
/// never hard-deleted; moderation happens through the status field.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE platform_role AS ENUM ('user', 'platform_admin');
/// CREATE TYPE user_status AS ENUM ('active', 'suspended', 'banned');
/// CREATE TYPE auth_provider AS ENUM ('local', 'google');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(100) NOT NULL UNIQUE,
///     username VARCHAR(60) UNIQUE,
///     password_hash VARCHAR(255),
///     google_id VARCHAR(255) UNIQUE,
///     auth_provider auth_provider NOT NULL DEFAULT 'local',
///     role platform_role NOT NULL DEFAULT 'user',
///     status user_status NOT NULL DEFAULT 'active',
///     full_name VARCHAR(255),
///     avatar VARCHAR(255),
///     phone VARCHAR(20) UNIQUE,
///     email_verified_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use eventra_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "alice@example.com".to_string(),
///     username: Some("alice".to_string()),
///     password_hash: Some("bsha256$...".to_string()),
///     full_name: Some("Alice".to_string()),
///     ..Default::default()
/// }).await?;
///
/// // Login accepts email or username interchangeably.
/// let found = User::find_by_identity(&pool, "alice").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Platform-wide role, independent of any organizer membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "platform_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    /// Regular account
    User,

    /// Platform operator: can moderate accounts
    PlatformAdmin,
}

impl PlatformRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformRole::User => "user",
            PlatformRole::PlatformAdmin => "platform_admin",
        }
    }
}

/// Account moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
    Banned,
}

impl UserStatus {
    /// Only active accounts may authenticate or act
    pub fn can_authenticate(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

/// How the account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Password credential stored locally
    Local,

    /// Google identity; no local password
    Google,
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Globally unique, the primary login identity
    pub email: String,

    /// Legacy secondary login identity
    pub username: Option<String>,

    /// Stored credential; empty for OAuth-only accounts.
    /// Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// OAuth subject identifier, unique when present
    pub google_id: Option<String>,

    pub auth_provider: AuthProvider,

    pub role: PlatformRole,

    pub status: UserStatus,

    pub full_name: Option<String>,

    pub avatar: Option<String>,

    /// Unique when present
    pub phone: Option<String>,

    /// Set once by email verification; second verification is a no-op
    pub email_verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    #[serde(default = "default_provider")]
    pub auth_provider: AuthProvider,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    /// Pre-verifies the address (OAuth signups, where the provider vouches)
    #[serde(default)]
    pub email_verified: bool,
}

impl Default for CreateUser {
    fn default() -> Self {
        Self {
            email: String::new(),
            username: None,
            password_hash: None,
            google_id: None,
            auth_provider: AuthProvider::Local,
            full_name: None,
            avatar: None,
            email_verified: false,
        }
    }
}

fn default_provider() -> AuthProvider {
    AuthProvider::Local
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

impl UpdateProfile {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.avatar.is_none() && self.phone.is_none()
    }
}

const USER_COLUMNS: &str = "id, email, username, password_hash, google_id, auth_provider, \
     role, status, full_name, avatar, phone, email_verified_at, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error on unique-constraint violation (email, username,
    /// google_id) or database failure.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, google_id, auth_provider,
                               full_name, avatar, email_verified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $8 THEN NOW() END)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.google_id)
        .bind(data.auth_provider)
        .bind(&data.full_name)
        .bind(&data.avatar)
        .bind(data.email_verified)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by login identity: email or username, interchangeably
    pub async fn find_by_identity(
        pool: &PgPool,
        identity: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
        ))
        .bind(identity)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by Google subject identifier
    pub async fn find_by_google_id(
        pool: &PgPool,
        google_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by phone number
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(pool)
        .await
    }

    /// Searches users by name, email, or username (case-insensitive substring)
    ///
    /// When `exclude_organizer_id` is given, users who already hold a
    /// membership in that organizer are filtered out; the invite picker's
    /// view of "who can still be added".
    pub async fn search(
        pool: &PgPool,
        query: &str,
        exclude_organizer_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE (email ILIKE $1 OR username ILIKE $1 OR full_name ILIKE $1)
              AND ($2::BIGINT IS NULL OR id NOT IN (
                  SELECT user_id FROM organizer_members WHERE organizer_id = $2
              ))
            ORDER BY email ASC
            LIMIT $3
            "#,
        ))
        .bind(&pattern)
        .bind(exclude_organizer_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial profile update and returns the fresh row
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        patch: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                avatar = COALESCE($3, avatar),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.full_name)
        .bind(&patch.avatar)
        .bind(&patch.phone)
        .fetch_optional(pool)
        .await
    }

    /// Sets the account status (platform moderation)
    pub async fn set_status(
        pool: &PgPool,
        id: i64,
        status: UserStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the stored credential (opportunistic hash upgrade on login)
    pub async fn set_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Records email verification
    ///
    /// Idempotent: returns `false` when the address was already verified, so
    /// a replayed link reports already-verified instead of erroring.
    pub async fn mark_email_verified(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET email_verified_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND email_verified_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_role_as_str() {
        assert_eq!(PlatformRole::User.as_str(), "user");
        assert_eq!(PlatformRole::PlatformAdmin.as_str(), "platform_admin");
    }

    #[test]
    fn test_only_active_can_authenticate() {
        assert!(UserStatus::Active.can_authenticate());
        assert!(!UserStatus::Suspended.can_authenticate());
        assert!(!UserStatus::Banned.can_authenticate());
    }

    #[test]
    fn test_update_profile_is_empty() {
        assert!(UpdateProfile::default().is_empty());

        let patch = UpdateProfile {
            phone: Some("+6281234".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".to_string(),
            username: None,
            password_hash: Some("bsha256$secret".to_string()),
            google_id: None,
            auth_provider: AuthProvider::Local,
            role: PlatformRole::User,
            status: UserStatus::Active,
            full_name: None,
            avatar: None,
            phone: None,
            email_verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("bsha256"));
    }
}
