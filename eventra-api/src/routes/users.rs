/// User profile and platform-moderation endpoints
///
/// # Endpoints
///
/// - `GET   /api/v1/users/me`: the caller's own record
/// - `PATCH /api/v1/users/me`: partial profile update
/// - `PATCH /api/v1/users/:id/status`: platform-admin moderation
/// - `GET   /api/v1/users/search`: member-invite picker
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use eventra_shared::models::user::{PlatformRole, UpdateProfile, User, UserStatus};

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
};

/// Returns the authenticated caller's record
pub async fn me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(user))
}

/// Profile patch request; absent fields are untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 255, message = "Avatar must be at most 255 characters"))]
    pub avatar: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

/// Applies a partial profile update to the caller
///
/// # Errors
///
/// - `409 Conflict`: phone number already belongs to another account
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<User>> {
    req.validate().map_err(validation_error)?;

    if let Some(phone) = &req.phone {
        if let Some(existing) = User::find_by_phone(&state.db, phone).await? {
            if existing.id != user.id {
                return Err(ApiError::Conflict(
                    "Phone number already in use".to_string(),
                ));
            }
        }
    }

    let updated = User::update_profile(
        &state.db,
        user.id,
        UpdateProfile {
            full_name: req.full_name,
            avatar: req.avatar,
            phone: req.phone,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: UserStatus,
}

/// Sets an account's status (platform-admin only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a platform admin, or the target is a
///   fellow platform admin
/// - `404 Not Found`: unknown user id
pub async fn set_status(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<User>> {
    if caller.role != PlatformRole::PlatformAdmin {
        return Err(ApiError::Forbidden(
            "Requires platform administrator".to_string(),
        ));
    }

    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // Admins cannot moderate each other through this endpoint.
    if target.role == PlatformRole::PlatformAdmin && target.id != caller.id {
        return Err(ApiError::Forbidden(
            "Cannot change the status of a platform administrator".to_string(),
        ));
    }

    let updated = User::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(
        target_user_id = id,
        acting_user_id = caller.id,
        status = ?req.status,
        "Account status changed"
    );

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    /// Exclude users already holding a membership in this organizer
    pub organizer_id: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<User>,
}

/// Searches users by name, email, or username
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Search query must not be empty".to_string(),
        ));
    }

    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let users = User::search(&state.db, query.q.trim(), query.organizer_id, limit).await?;

    Ok(Json(SearchResponse { users }))
}
