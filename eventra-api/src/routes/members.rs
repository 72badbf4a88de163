/// Organizer membership endpoints
///
/// # Endpoints
///
/// - `POST   /api/v1/organizers/:id/members`: invite by user id (admin)
/// - `POST   /api/v1/organizers/:id/members/invite-by-email`: invite (admin)
/// - `GET    /api/v1/organizers/:id/members`: roster (any active member)
/// - `GET    /api/v1/organizers/:id/members/:user_id`
/// - `PATCH  /api/v1/organizers/:id/members/:user_id`: role/status (admin)
/// - `DELETE /api/v1/organizers/:id/members/:user_id`: remove (admin)
/// - `POST   /api/v1/organizers/:id/leave`: remove own seat
///
/// Admins cannot update or remove their own seat through the management
/// paths; `leave` is the only exit, and the sole active admin is refused
/// until the role has been handed over.
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use eventra_shared::auth::guard;
use eventra_shared::models::member::{CreateMember, Member, MemberRole, MemberStatus, UpdateMember};
use eventra_shared::models::user::User;

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
};

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub user_id: i64,
    pub role: MemberRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteByEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: MemberRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub role: Option<MemberRole>,
    pub status: Option<MemberStatus>,
}

#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// Adds a registered user to the organizer (admin only)
///
/// # Errors
///
/// - `404 Not Found`: no such user
/// - `409 Conflict`: user is already a member
pub async fn invite(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(organizer_id): Path<i64>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<Json<Member>> {
    guard::require_admin(&state.db, organizer_id, caller.id).await?;

    let target = User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if Member::find(&state.db, organizer_id, target.id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "User is already a member of this organizer".to_string(),
        ));
    }

    let member = Member::create(
        &state.db,
        CreateMember {
            organizer_id,
            user_id: target.id,
            role: req.role,
        },
    )
    .await?;

    info!(
        organizer_id,
        user_id = target.id,
        role = ?req.role,
        invited_by = caller.id,
        "Added organizer member"
    );

    Ok(Json(member))
}

/// Adds a member looked up by email (admin only)
///
/// Only already-registered addresses can be invited; an unknown email is a
/// `404`, not a pending invitation.
pub async fn invite_by_email(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(organizer_id): Path<i64>,
    Json(req): Json<InviteByEmailRequest>,
) -> ApiResult<Json<Member>> {
    req.validate().map_err(validation_error)?;

    guard::require_admin(&state.db, organizer_id, caller.id).await?;

    let target = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No registered account with this email".to_string())
        })?;

    if Member::find(&state.db, organizer_id, target.id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "User is already a member of this organizer".to_string(),
        ));
    }

    let member = Member::create(
        &state.db,
        CreateMember {
            organizer_id,
            user_id: target.id,
            role: req.role,
        },
    )
    .await?;

    info!(
        organizer_id,
        user_id = target.id,
        role = ?req.role,
        invited_by = caller.id,
        "Added organizer member by email"
    );

    Ok(Json(member))
}

/// Lists the organizer's members (any active member)
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(organizer_id): Path<i64>,
) -> ApiResult<Json<MemberListResponse>> {
    guard::require_active_member(&state.db, organizer_id, caller.id).await?;

    let members = Member::list_by_organizer(&state.db, organizer_id).await?;

    Ok(Json(MemberListResponse { members }))
}

/// Fetches a single membership (any active member)
pub async fn get_member(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path((organizer_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Member>> {
    guard::require_active_member(&state.db, organizer_id, caller.id).await?;

    let member = Member::find(&state.db, organizer_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    Ok(Json(member))
}

/// Changes a member's role or status (admin only, never the caller's own
/// seat)
pub async fn update_member(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path((organizer_id, user_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Json<Member>> {
    guard::require_admin(&state.db, organizer_id, caller.id).await?;
    guard::ensure_not_self(caller.id, user_id)?;

    let member = Member::update(
        &state.db,
        organizer_id,
        user_id,
        UpdateMember {
            role: req.role,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    info!(
        organizer_id,
        user_id,
        acting_user_id = caller.id,
        "Updated organizer membership"
    );

    Ok(Json(member))
}

/// Removes a member (admin only, never the caller's own seat)
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path((organizer_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<RemovedResponse>> {
    guard::require_admin(&state.db, organizer_id, caller.id).await?;
    guard::ensure_not_self(caller.id, user_id)?;

    let removed = Member::delete(&state.db, organizer_id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    info!(
        organizer_id,
        user_id,
        acting_user_id = caller.id,
        "Removed organizer member"
    );

    Ok(Json(RemovedResponse { removed: true }))
}

/// Removes the caller's own membership
///
/// # Errors
///
/// - `400 Bad Request`: the caller is the organizer's only active admin
/// - `403 Forbidden`: the caller holds no active membership here
pub async fn leave(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(organizer_id): Path<i64>,
) -> ApiResult<Json<RemovedResponse>> {
    guard::leave_organizer(&state.db, organizer_id, caller.id).await?;

    info!(organizer_id, user_id = caller.id, "Member left organizer");

    Ok(Json(RemovedResponse { removed: true }))
}
