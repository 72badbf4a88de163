/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register`: create a password account, auto-login
/// - `POST /api/v1/auth/login`: email or username + password
/// - `POST /api/v1/auth/google`: Google identity assertion
/// - `GET  /api/v1/auth/verify-email?token=`: claim a mailed link
/// - `POST /api/v1/auth/send-verification`: issue a fresh link (bearer)
///
/// Login performs the opportunistic credential upgrade: a successful
/// password check against a legacy-format hash rewrites the stored value in
/// the current format before the response is produced.
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use eventra_shared::auth::{credential, token};
use eventra_shared::models::user::{AuthProvider, CreateUser, User};

use crate::{
    app::{AppState, CurrentUser},
    error::{validation_error, ApiError, ApiResult},
    google, mailer,
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 60, message = "Username must be 3-60 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Login request; `identity` is an email or a username
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Identity is required"))]
    pub identity: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Google login request
///
/// Production sends `id_token`; the development flow (no configured client
/// id) sends `email` directly.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

/// Session response returned by every login-shaped endpoint
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

fn session_response(state: &AppState, user: User) -> ApiResult<SessionResponse> {
    let access_token = token::issue_session(&state.tokens, user.id, user.role.as_str())?;

    Ok(SessionResponse {
        access_token,
        token_type: "bearer",
        user,
    })
}

/// Registers a password account and logs it in
///
/// # Errors
///
/// - `409 Conflict`: email or username already taken
/// - `422 Unprocessable Entity`: request validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate().map_err(validation_error)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }
    if let Some(username) = &req.username {
        if User::find_by_username(&state.db, username).await?.is_some() {
            return Err(ApiError::Conflict("Username already in use".to_string()));
        }
    }

    let password_hash = credential::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            password_hash: Some(password_hash),
            full_name: req.full_name,
            ..Default::default()
        },
    )
    .await?;

    info!(user_id = user.id, "Registered new account");

    Ok(Json(session_response(&state, user)?))
}

/// Authenticates with an email or username plus password
///
/// # Errors
///
/// - `400 Bad Request`: account authenticates through Google
/// - `401 Unauthorized`: unknown identity or wrong password
/// - `403 Forbidden`: account suspended or banned
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_identity(&state.db, &req.identity)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid identity or password".to_string()))?;

    if user.auth_provider == AuthProvider::Google {
        return Err(ApiError::BadRequest(
            "This account signs in with Google".to_string(),
        ));
    }

    let stored = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid identity or password".to_string()))?;

    if !credential::verify_password(&req.password, stored) {
        return Err(ApiError::Unauthorized(
            "Invalid identity or password".to_string(),
        ));
    }

    if !user.status.can_authenticate() {
        return Err(ApiError::Forbidden("Account is not active".to_string()));
    }

    // The caller just proved the password; commit the upgraded hash if the
    // stored one is on a legacy format.
    if let Some(upgraded) = credential::maybe_upgrade(&req.password, stored)? {
        User::set_password_hash(&state.db, user.id, &upgraded).await?;
        info!(user_id = user.id, "Upgraded stored credential format");
    }

    Ok(Json(session_response(&state, user)?))
}

/// Authenticates with a Google identity, creating the account on first login
///
/// With a configured client id the provider token is verified against
/// Google; without one, the request's email is trusted outright, a
/// development-only downgrade that is logged on every use.
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    // Username is only accepted through the development flow; Google does
    // not assert one.
    let mut dev_username = None;

    let identity = match &state.config.google.client_id {
        Some(client_id) => {
            let id_token = req.id_token.as_deref().ok_or_else(|| {
                ApiError::BadRequest("id_token is required".to_string())
            })?;
            google::verify_id_token(&state.http, id_token, client_id).await?
        }
        None => {
            let email = req.email.clone().ok_or_else(|| {
                ApiError::BadRequest("email is required".to_string())
            })?;
            warn!(
                %email,
                "GOOGLE_CLIENT_ID not configured: accepting unverified identity (development only)"
            );
            dev_username = req.username.clone();
            google::GoogleIdentity {
                subject: format!("dev:{}", email),
                email,
                name: req.full_name.clone(),
                picture: None,
            }
        }
    };

    let user = match User::find_by_google_id(&state.db, &identity.subject).await? {
        Some(user) => user,
        None => match User::find_by_email(&state.db, &identity.email).await? {
            // An existing password account with this email keeps its row;
            // Google login is not linked implicitly.
            Some(_) => {
                return Err(ApiError::Conflict(
                    "Email already registered with a password account".to_string(),
                ))
            }
            None => {
                let user = User::create(
                    &state.db,
                    CreateUser {
                        email: identity.email,
                        username: dev_username,
                        google_id: Some(identity.subject),
                        auth_provider: AuthProvider::Google,
                        full_name: identity.name,
                        avatar: identity.picture,
                        // The provider vouches for the address
                        email_verified: true,
                        ..Default::default()
                    },
                )
                .await?;
                info!(user_id = user.id, "Created account from Google identity");
                user
            }
        },
    };

    if !user.status.can_authenticate() {
        return Err(ApiError::Forbidden("Account is not active".to_string()));
    }

    Ok(Json(session_response(&state, user)?))
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub verified: bool,
    /// True when the address had been verified before this call
    pub already_verified: bool,
}

/// Claims an email-verification link
///
/// Idempotent: a replayed link reports `already_verified` instead of
/// erroring. Session tokens are rejected here by the purpose check.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> ApiResult<Json<VerifyEmailResponse>> {
    let claims = token::verify_email_token(&state.tokens, &query.token)?;
    let user_id = claims.user_id()?;

    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let newly_verified = User::mark_email_verified(&state.db, user_id).await?;

    Ok(Json(VerifyEmailResponse {
        verified: true,
        already_verified: !newly_verified,
    }))
}

#[derive(Debug, Serialize)]
pub struct SendVerificationResponse {
    pub message: String,
}

/// Issues a fresh verification link for the caller's address
pub async fn send_verification(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<SendVerificationResponse>> {
    if user.email_verified_at.is_some() {
        return Ok(Json(SendVerificationResponse {
            message: "Email is already verified".to_string(),
        }));
    }

    let verify_token = token::issue_email_verify(&state.tokens, user.id)?;
    let link = format!(
        "{}/api/v1/auth/verify-email?token={}",
        state.config.api.public_base_url, verify_token
    );

    mailer::send_verification_email(&user.email, &link);

    Ok(Json(SendVerificationResponse {
        message: "Verification email dispatched".to_string(),
    }))
}
