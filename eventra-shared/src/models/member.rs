/// Organizer membership model and database operations
///
/// Join entity between users and organizers with role-based access control,
/// composite-keyed on (organizer_id, user_id).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('organizer_admin', 'finance', 'gate', 'viewer');
/// CREATE TYPE member_status AS ENUM ('active', 'inactive');
///
/// CREATE TABLE organizer_members (
///     organizer_id BIGINT NOT NULL REFERENCES organizers(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL,
///     status member_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (organizer_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **organizer_admin**: manages the organizer, its members, and events
/// - **finance**: payouts and financial reports
/// - **gate**: check-in scanning only
/// - **viewer**: read-only access
///
/// Every organizer must keep at least one active `organizer_admin`. That
/// invariant is enforced at the policy layer (see `auth::guard`), not by the
/// database.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

/// RBAC roles within an organizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Manages the organizer, its members, and events
    OrganizerAdmin,

    /// Payouts and financial reports
    Finance,

    /// Check-in scanning only
    Gate,

    /// Read-only access
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::OrganizerAdmin => "organizer_admin",
            MemberRole::Finance => "finance",
            MemberRole::Gate => "gate",
            MemberRole::Viewer => "viewer",
        }
    }

    /// Can manage members, rename the organizer, suspend it
    pub fn is_admin(&self) -> bool {
        matches!(self, MemberRole::OrganizerAdmin)
    }

    /// Can see financial resources (payouts, revenue reports)
    pub fn can_view_finance(&self) -> bool {
        matches!(self, MemberRole::OrganizerAdmin | MemberRole::Finance)
    }
}

/// Membership status: `active ⇄ inactive` by explicit update only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, MemberStatus::Active)
    }
}

/// Membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub organizer_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a member to an organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub organizer_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
}

/// Partial membership update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    pub role: Option<MemberRole>,
    pub status: Option<MemberStatus>,
}

const MEMBER_COLUMNS: &str = "organizer_id, user_id, role, status, created_at, updated_at";

impl Member {
    /// Adds a user to an organizer
    ///
    /// # Errors
    ///
    /// Returns an error if the membership already exists (primary-key
    /// violation), either side is missing (foreign-key violation), or the
    /// database fails.
    pub async fn create(pool: &PgPool, data: CreateMember) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO organizer_members (organizer_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(data.organizer_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }

    /// Inserts a membership inside an existing transaction
    ///
    /// Used when the row must land atomically with other writes, such as the
    /// creator's admin seat during organizer creation.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateMember,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO organizer_members (organizer_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(data.organizer_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(&mut **tx)
        .await
    }

    /// Finds a membership by its composite key
    pub async fn find(
        pool: &PgPool,
        organizer_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS} FROM organizer_members
            WHERE organizer_id = $1 AND user_id = $2
            "#,
        ))
        .bind(organizer_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all members of an organizer, oldest first
    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS} FROM organizer_members
            WHERE organizer_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(organizer_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update to a membership and returns the fresh row
    pub async fn update(
        pool: &PgPool,
        organizer_id: i64,
        user_id: i64,
        patch: UpdateMember,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE organizer_members
            SET role = COALESCE($3, role),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE organizer_id = $1 AND user_id = $2
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(organizer_id)
        .bind(user_id)
        .bind(patch.role)
        .bind(patch.status)
        .fetch_optional(pool)
        .await
    }

    /// Removes a membership; true if a row was deleted
    pub async fn delete(
        pool: &PgPool,
        organizer_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM organizer_members WHERE organizer_id = $1 AND user_id = $2")
                .bind(organizer_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a membership inside an existing transaction
    pub async fn delete_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        organizer_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM organizer_members WHERE organizer_id = $1 AND user_id = $2")
                .bind(organizer_id)
                .bind(user_id)
                .execute(&mut **tx)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Locks the organizer's active admin rows and returns their user ids
    ///
    /// `FOR UPDATE` serializes concurrent leave attempts: two admins of a
    /// two-admin organizer cannot both observe two admins and both remove
    /// themselves. The stable `ORDER BY user_id` makes every transaction
    /// take the row locks in the same order, so concurrent leaves queue on
    /// the first admin row instead of deadlocking. Must be the transaction's
    /// only explicit lock acquisition, and the dependent delete must run in
    /// the same transaction.
    pub async fn lock_active_admins(
        tx: &mut Transaction<'_, Postgres>,
        organizer_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT user_id FROM organizer_members
            WHERE organizer_id = $1 AND role = 'organizer_admin' AND status = 'active'
            ORDER BY user_id
            FOR UPDATE
            "#,
        )
        .bind(organizer_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_as_str() {
        assert_eq!(MemberRole::OrganizerAdmin.as_str(), "organizer_admin");
        assert_eq!(MemberRole::Finance.as_str(), "finance");
        assert_eq!(MemberRole::Gate.as_str(), "gate");
        assert_eq!(MemberRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_role_permissions() {
        assert!(MemberRole::OrganizerAdmin.is_admin());
        assert!(MemberRole::OrganizerAdmin.can_view_finance());

        assert!(!MemberRole::Finance.is_admin());
        assert!(MemberRole::Finance.can_view_finance());

        assert!(!MemberRole::Gate.is_admin());
        assert!(!MemberRole::Gate.can_view_finance());

        assert!(!MemberRole::Viewer.is_admin());
        assert!(!MemberRole::Viewer.can_view_finance());
    }

    #[test]
    fn test_member_status_is_active() {
        assert!(MemberStatus::Active.is_active());
        assert!(!MemberStatus::Inactive.is_active());
    }
}
