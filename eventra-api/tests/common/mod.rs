/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations applied on connect)
/// - Test user creation with session tokens
/// - Router construction against live state
/// - Response body helpers

use eventra_api::app::{build_router, AppState};
use eventra_api::config::Config;
use eventra_shared::auth::{credential, token};
use eventra_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a test context against the configured database
    ///
    /// Returns `None` when `DATABASE_URL` is not set, so the suite is
    /// skipped outside a database environment.
    pub async fn new() -> Option<Self> {
        dotenvy::dotenv().ok();
        std::env::var("DATABASE_URL").ok()?;
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var("JWT_SECRET", "integration-test-secret-at-least-32-bytes");
        }

        let config = Config::from_env().expect("config should load");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("database should be reachable");

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../eventra-shared/migrations")
            .run(&db)
            .await
            .expect("migrations should apply");

        let state = AppState::new(db.clone(), config);
        let app = build_router(state.clone());

        Some(TestContext { db, app, state })
    }

    /// Creates a password account with unique identities and a session
    /// token for it
    pub async fn create_user(&self) -> (User, String) {
        let tag = Uuid::new_v4().simple().to_string();
        let password_hash =
            credential::hash_password("integration-password-1").expect("hash should succeed");

        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("user-{}@example.com", tag),
                username: Some(format!("user-{}", tag)),
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await
        .expect("user should insert");

        let jwt_token = token::issue_session(&self.state.tokens, user.id, user.role.as_str())
            .expect("token should issue");

        (user, jwt_token)
    }

    /// Returns an authorization header value for the token
    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Deletes a user row; memberships cascade
    pub async fn cleanup_user(&self, user_id: i64) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .expect("cleanup should succeed");
    }

    /// Deletes an organizer row; memberships and downstream data cascade
    pub async fn cleanup_organizer(&self, organizer_id: i64) {
        sqlx::query("DELETE FROM organizers WHERE id = $1")
            .bind(organizer_id)
            .execute(&self.db)
            .await
            .expect("cleanup should succeed");
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&body).expect("body should be JSON")
}
