/// Organizer (tenant) model and database operations
///
/// Organizers are the tenancy boundary: events, orders, payouts, and promo
/// codes all hang off one. Creation is transactional: the creating user
/// becomes the organizer's first active `organizer_admin` member in the same
/// transaction, so an organizer never exists without an admin. Deletion is a
/// soft transition to `suspended`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE organizer_status AS ENUM ('pending', 'verified', 'suspended');
///
/// CREATE TABLE organizers (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     slug VARCHAR(100) NOT NULL UNIQUE,
///     status organizer_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use eventra_shared::models::organizer::Organizer;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// // Slug is derived from the name; a second "Acme Corp" gets acme-corp-1.
/// let org = Organizer::create_with_admin(&pool, "Acme Corp", 1).await?;
/// assert_eq!(org.slug, "acme-corp");
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::member::{CreateMember, Member, MemberRole};
use crate::slug;

/// Organizer verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "organizer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrganizerStatus {
    /// Created, not yet reviewed
    Pending,

    /// Reviewed and approved by the platform
    Verified,

    /// Soft-deleted or sanctioned
    Suspended,
}

/// Organizer model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organizer {
    pub id: i64,

    /// Display name; repeats are allowed, the slug disambiguates
    pub name: String,

    /// Globally unique, derived from the name
    pub slug: String,

    pub status: OrganizerStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

const ORGANIZER_COLUMNS: &str = "id, name, slug, status, created_at, updated_at";
const ORGANIZER_COLUMNS_QUALIFIED: &str =
    "o.id, o.name, o.slug, o.status, o.created_at, o.updated_at";

/// Finds the first free slug for a name, inside the given transaction
///
/// Tries the base slug, then `-1`, `-2`, ... until no row claims it. When
/// regenerating for a rename, `exclude_id` lets the organizer keep a slug it
/// already owns.
async fn next_free_slug(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<String, sqlx::Error> {
    let base = slug::slugify(name);

    let mut attempt = 0;
    loop {
        let candidate = slug::with_suffix(&base, attempt);

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM organizers
                WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(&candidate)
        .bind(exclude_id)
        .fetch_one(&mut **tx)
        .await?;

        if !taken {
            return Ok(candidate);
        }
        attempt += 1;
    }
}

impl Organizer {
    /// Creates an organizer and seats its first admin, atomically
    ///
    /// Inserts the organizer with a collision-free slug and the creator's
    /// active `organizer_admin` membership in one transaction, so the
    /// sole-admin invariant holds from the very first instant.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure; nothing is committed on
    /// failure.
    pub async fn create_with_admin(
        pool: &PgPool,
        name: &str,
        creator_user_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let slug = next_free_slug(&mut tx, name, None).await?;

        let organizer = sqlx::query_as::<_, Organizer>(&format!(
            r#"
            INSERT INTO organizers (name, slug)
            VALUES ($1, $2)
            RETURNING {ORGANIZER_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(&slug)
        .fetch_one(&mut *tx)
        .await?;

        Member::create_in_tx(
            &mut tx,
            CreateMember {
                organizer_id: organizer.id,
                user_id: creator_user_id,
                role: MemberRole::OrganizerAdmin,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(organizer)
    }

    /// Finds an organizer by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an organizer by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    /// Lists organizers the user holds any membership in, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organizer>(&format!(
            r#"
            SELECT {ORGANIZER_COLUMNS_QUALIFIED}
            FROM organizers o
            JOIN organizer_members m ON m.organizer_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.created_at ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Renames an organizer, regenerating its slug
    ///
    /// The slug search excludes the organizer's own row, so renaming to a
    /// name that slugs back to the current slug is a no-op rather than a
    /// collision.
    pub async fn rename(
        pool: &PgPool,
        id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let slug = next_free_slug(&mut tx, name, Some(id)).await?;

        let organizer = sqlx::query_as::<_, Organizer>(&format!(
            r#"
            UPDATE organizers
            SET name = $2, slug = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORGANIZER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(&slug)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(organizer)
    }

    /// Sets the organizer status
    pub async fn set_status(
        pool: &PgPool,
        id: i64,
        status: OrganizerStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organizer>(&format!(
            r#"
            UPDATE organizers SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORGANIZER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes an organizer by suspending it
    pub async fn suspend(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        Self::set_status(pool, id, OrganizerStatus::Suspended).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&OrganizerStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let parsed: OrganizerStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(parsed, OrganizerStatus::Suspended);
    }

    // Slug derivation and suffixing are covered in crate::slug; transactional
    // creation is exercised through the HTTP layer against a live database.
}
