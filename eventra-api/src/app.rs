/// Application state and router builder
///
/// Defines the shared state cloned into each handler and assembles the Axum
/// router: routes, bearer authentication middleware, CORS, and request
/// tracing.
///
/// # Example
///
/// ```no_run
/// use eventra_api::{app::{AppState, build_router}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use eventra_shared::auth::token::{self, TokenConfig};
use eventra_shared::models::user::User;

use crate::{config::Config, error::ApiError};

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token signing configuration, derived from config at startup
    pub tokens: Arc<TokenConfig>,

    /// Outbound HTTP client (Google token verification)
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = Arc::new(config.token_config());
        Self {
            db,
            config: Arc::new(config),
            tokens,
            http: reqwest::Client::new(),
        }
    }
}

/// The authenticated caller, injected into request extensions by
/// [`auth_layer`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Builds the complete Axum router
///
/// ```text
/// /api/v1
/// ├── /health                                   (public)
/// ├── /auth/{register,login,google,verify-email} (public)
/// ├── /auth/send-verification                   (bearer)
/// ├── /users/...                                (bearer)
/// └── /organizers/...                           (bearer)
/// ```
///
/// Middleware, outermost first: tracing, CORS, then bearer authentication on
/// the protected subtree.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public: no bearer token required
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/google", post(routes::auth::google_login))
        .route("/auth/verify-email", get(routes::auth::verify_email));

    // Everything below requires an authenticated, active account
    let protected_routes = Router::new()
        .route(
            "/auth/send-verification",
            post(routes::auth::send_verification),
        )
        .route(
            "/users/me",
            get(routes::users::me).patch(routes::users::update_me),
        )
        .route("/users/:id/status", patch(routes::users::set_status))
        .route("/users/search", get(routes::users::search))
        .route(
            "/organizers",
            post(routes::organizers::create),
        )
        .route(
            "/organizers/my-organizers",
            get(routes::organizers::my_organizers),
        )
        .route(
            "/organizers/:id",
            get(routes::organizers::get_by_id)
                .patch(routes::organizers::update)
                .delete(routes::organizers::remove),
        )
        .route(
            "/organizers/slug/:slug",
            get(routes::organizers::get_by_slug),
        )
        .route(
            "/organizers/:id/members",
            post(routes::members::invite).get(routes::members::list),
        )
        .route(
            "/organizers/:id/members/invite-by-email",
            post(routes::members::invite_by_email),
        )
        .route(
            "/organizers/:id/members/:user_id",
            get(routes::members::get_member)
                .patch(routes::members::update_member)
                .delete(routes::members::remove_member),
        )
        .route("/organizers/:id/leave", post(routes::members::leave))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1 = Router::new().merge(public_routes).merge(protected_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api/v1", v1)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware
///
/// Verifies the session token (purpose-checked), loads the account, rejects
/// anything but `active` status, and injects [`CurrentUser`] into request
/// extensions.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let bearer = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = token::verify_session(&state.tokens, bearer)?;
    let user_id = claims.user_id()?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    if !user.status.can_authenticate() {
        return Err(ApiError::Forbidden("Account is not active".to_string()));
    }

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
