/// Organizer management endpoints
///
/// # Endpoints
///
/// - `POST   /api/v1/organizers`: create; the caller becomes the first admin
/// - `GET    /api/v1/organizers/my-organizers`: the caller's organizers
/// - `GET    /api/v1/organizers/:id`
/// - `GET    /api/v1/organizers/slug/:slug`
/// - `PATCH  /api/v1/organizers/:id`: rename, regenerates the slug (admin)
/// - `DELETE /api/v1/organizers/:id`: soft-delete to `suspended` (admin)
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use eventra_shared::auth::guard;
use eventra_shared::models::organizer::Organizer;

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizerRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrganizerRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct OrganizerListResponse {
    pub organizers: Vec<Organizer>,
}

/// Creates an organizer with the caller seated as its first admin
///
/// Repeated names are allowed; the slug disambiguates (`acme-corp`,
/// `acme-corp-1`, ...).
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateOrganizerRequest>,
) -> ApiResult<Json<Organizer>> {
    req.validate().map_err(validation_error)?;

    let organizer = Organizer::create_with_admin(&state.db, req.name.trim(), user.id).await?;

    info!(
        organizer_id = organizer.id,
        user_id = user.id,
        slug = %organizer.slug,
        "Created organizer"
    );

    Ok(Json(organizer))
}

/// Lists the organizers the caller holds a membership in
pub async fn my_organizers(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<OrganizerListResponse>> {
    let organizers = Organizer::list_for_user(&state.db, user.id).await?;

    Ok(Json(OrganizerListResponse { organizers }))
}

/// Fetches an organizer by id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Organizer>> {
    let organizer = Organizer::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organizer not found".to_string()))?;

    Ok(Json(organizer))
}

/// Fetches an organizer by slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Organizer>> {
    let organizer = Organizer::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organizer not found".to_string()))?;

    Ok(Json(organizer))
}

/// Renames an organizer (admin only); the slug is regenerated from the new
/// name
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an active admin of this organizer
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrganizerRequest>,
) -> ApiResult<Json<Organizer>> {
    req.validate().map_err(validation_error)?;

    guard::require_admin(&state.db, id, user.id).await?;

    let organizer = Organizer::rename(&state.db, id, req.name.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Organizer not found".to_string()))?;

    info!(organizer_id = id, slug = %organizer.slug, "Renamed organizer");

    Ok(Json(organizer))
}

/// Soft-deletes an organizer by suspending it (admin only)
pub async fn remove(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Organizer>> {
    guard::require_admin(&state.db, id, user.id).await?;

    let organizer = Organizer::suspend(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organizer not found".to_string()))?;

    info!(organizer_id = id, acting_user_id = user.id, "Suspended organizer");

    Ok(Json(organizer))
}
