/// Membership-based authorization guards
///
/// Gates organizer-scoped operations on the caller's resolved membership.
/// Guards return results rather than unwinding: callers compose them with
/// `?` and map [`GuardError`] onto HTTP statuses at the boundary.
///
/// # Permission model
///
/// 1. **Membership**: the caller must hold an `active` membership row for
///    the addressed organizer; anything less is `Forbidden`.
/// 2. **Role**: admin-only operations require `organizer_admin`; financial
///    reads accept `organizer_admin` or `finance`.
/// 3. **Self-action**: an admin may not update or remove their own seat
///    through the member-management path; `BadRequest`.
/// 4. **Sole-admin invariant**: every organizer keeps at least one active
///    `organizer_admin`. The sole holder of that seat cannot leave until
///    the role has been transferred.
///
/// # Example
///
/// ```no_run
/// use eventra_shared::auth::guard::{require_admin, ensure_not_self};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, organizer_id: i64, caller_id: i64, target_id: i64)
/// #     -> Result<(), Box<dyn std::error::Error>> {
/// let acting = require_admin(&pool, organizer_id, caller_id).await?;
/// ensure_not_self(acting.user_id, target_id)?;
/// // ... mutate the target membership
/// # Ok(())
/// # }
/// ```
use sqlx::PgPool;

use crate::models::member::{Member, MemberRole};

/// Error type for authorization guards
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Authenticated but not permitted (wrong role, inactive or missing
    /// membership)
    #[error("Not permitted: {0}")]
    Forbidden(String),

    /// The operation is categorically disallowed in this shape
    /// (self-action, sole-admin leave)
    #[error("{0}")]
    BadRequest(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Looks up the caller's membership record, if any
pub async fn resolve_membership(
    pool: &PgPool,
    organizer_id: i64,
    user_id: i64,
) -> Result<Option<Member>, sqlx::Error> {
    Member::find(pool, organizer_id, user_id).await
}

/// Pure check: membership exists and is active
fn ensure_active(member: Option<Member>) -> Result<Member, GuardError> {
    match member {
        Some(m) if m.status.is_active() => Ok(m),
        Some(_) => Err(GuardError::Forbidden(
            "Membership is inactive".to_string(),
        )),
        None => Err(GuardError::Forbidden(
            "Not a member of this organizer".to_string(),
        )),
    }
}

/// Pure check: active member holds one of the accepted roles
fn ensure_role(member: Member, accepted: &[MemberRole]) -> Result<Member, GuardError> {
    if accepted.contains(&member.role) {
        Ok(member)
    } else {
        Err(GuardError::Forbidden(format!(
            "Requires one of {:?}, has {:?}",
            accepted, member.role
        )))
    }
}

/// Pure check: whether an admin may leave, given the locked set of active
/// admin user ids
///
/// The set is re-read under lock, so it can differ from the caller's
/// initial read: a caller no longer in the set lost the admin seat in the
/// meantime and leaves freely; a caller alone in the set is the sole admin.
fn ensure_admin_can_leave(user_id: i64, locked_admin_ids: &[i64]) -> Result<(), GuardError> {
    if locked_admin_ids.contains(&user_id) && locked_admin_ids.len() <= 1 {
        return Err(GuardError::BadRequest(
            "Sole admin must transfer the role before leaving".to_string(),
        ));
    }

    Ok(())
}

/// Requires an active membership of any role
pub async fn require_active_member(
    pool: &PgPool,
    organizer_id: i64,
    user_id: i64,
) -> Result<Member, GuardError> {
    let member = resolve_membership(pool, organizer_id, user_id).await?;
    ensure_active(member)
}

/// Requires an active `organizer_admin` membership
pub async fn require_admin(
    pool: &PgPool,
    organizer_id: i64,
    user_id: i64,
) -> Result<Member, GuardError> {
    let member = require_active_member(pool, organizer_id, user_id).await?;
    ensure_role(member, &[MemberRole::OrganizerAdmin])
}

/// Requires an active `organizer_admin` or `finance` membership
pub async fn require_admin_or_finance(
    pool: &PgPool,
    organizer_id: i64,
    user_id: i64,
) -> Result<Member, GuardError> {
    let member = require_active_member(pool, organizer_id, user_id).await?;
    ensure_role(member, &[MemberRole::OrganizerAdmin, MemberRole::Finance])
}

/// Rejects member-management operations targeting the acting user
///
/// Self-demotion and self-removal are disallowed through this path; the
/// leave operation exists for that.
pub fn ensure_not_self(acting_user_id: i64, target_user_id: i64) -> Result<(), GuardError> {
    if acting_user_id == target_user_id {
        return Err(GuardError::BadRequest(
            "Cannot update or remove your own membership; use leave instead".to_string(),
        ));
    }

    Ok(())
}

/// Removes the caller's own membership, honoring the sole-admin invariant
///
/// Runs in one transaction. When the caller is an active admin, the
/// organizer's active admin rows are locked with a single
/// `SELECT ... FOR UPDATE` in `user_id` order before the decision; two
/// admins of a two-admin organizer leaving at once queue on the same lock
/// set, and whichever transaction waits re-reads a set of one and is
/// refused. That ordered statement is the transaction's only explicit lock,
/// so concurrent leaves cannot deadlock on each other's membership rows.
/// The membership is deleted outright; the caller must currently be an
/// active member.
pub async fn leave_organizer(
    pool: &PgPool,
    organizer_id: i64,
    user_id: i64,
) -> Result<(), GuardError> {
    let mut tx = pool.begin().await?;

    let member = sqlx::query_as::<_, Member>(
        r#"
        SELECT organizer_id, user_id, role, status, created_at, updated_at
        FROM organizer_members
        WHERE organizer_id = $1 AND user_id = $2
        "#,
    )
    .bind(organizer_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let member = ensure_active(member)?;

    if member.role == MemberRole::OrganizerAdmin {
        let admins = Member::lock_active_admins(&mut tx, organizer_id).await?;
        ensure_admin_can_leave(user_id, &admins)?;
    }

    Member::delete_in_tx(&mut tx, organizer_id, user_id).await?;

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::MemberStatus;
    use chrono::Utc;

    fn member(role: MemberRole, status: MemberStatus) -> Member {
        Member {
            organizer_id: 1,
            user_id: 10,
            role,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_non_member_is_forbidden() {
        let err = ensure_active(None).unwrap_err();
        assert!(matches!(err, GuardError::Forbidden(_)));
    }

    #[test]
    fn test_inactive_member_is_forbidden() {
        let m = member(MemberRole::OrganizerAdmin, MemberStatus::Inactive);
        let err = ensure_active(Some(m)).unwrap_err();
        assert!(matches!(err, GuardError::Forbidden(_)));
    }

    #[test]
    fn test_active_member_passes() {
        let m = member(MemberRole::Viewer, MemberStatus::Active);
        assert!(ensure_active(Some(m)).is_ok());
    }

    #[test]
    fn test_viewer_fails_admin_check() {
        let m = member(MemberRole::Viewer, MemberStatus::Active);
        let err = ensure_role(m, &[MemberRole::OrganizerAdmin]).unwrap_err();
        assert!(matches!(err, GuardError::Forbidden(_)));
    }

    #[test]
    fn test_admin_passes_admin_check() {
        let m = member(MemberRole::OrganizerAdmin, MemberStatus::Active);
        assert!(ensure_role(m, &[MemberRole::OrganizerAdmin]).is_ok());
    }

    #[test]
    fn test_finance_passes_admin_or_finance_check() {
        let m = member(MemberRole::Finance, MemberStatus::Active);
        assert!(ensure_role(m, &[MemberRole::OrganizerAdmin, MemberRole::Finance]).is_ok());

        let m = member(MemberRole::Gate, MemberStatus::Active);
        assert!(ensure_role(m, &[MemberRole::OrganizerAdmin, MemberRole::Finance]).is_err());
    }

    #[test]
    fn test_self_action_rejected() {
        let err = ensure_not_self(10, 10).unwrap_err();
        assert!(matches!(err, GuardError::BadRequest(_)));

        assert!(ensure_not_self(10, 11).is_ok());
    }

    #[test]
    fn test_sole_admin_cannot_leave() {
        let err = ensure_admin_can_leave(10, &[10]).unwrap_err();
        assert!(matches!(err, GuardError::BadRequest(_)));
    }

    #[test]
    fn test_admin_can_leave_with_a_second_admin() {
        assert!(ensure_admin_can_leave(10, &[10, 11]).is_ok());
    }

    #[test]
    fn test_second_of_two_concurrent_leavers_is_refused() {
        // The other admin's leave committed between this caller's initial
        // read and the locked re-read; only the caller's own seat remains.
        let err = ensure_admin_can_leave(11, &[11]).unwrap_err();
        assert!(matches!(err, GuardError::BadRequest(_)));
    }

    #[test]
    fn test_concurrently_demoted_admin_leaves_freely() {
        // The locked re-read no longer contains the caller's seat.
        assert!(ensure_admin_can_leave(10, &[11]).is_ok());
    }
}
