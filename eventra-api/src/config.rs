/// Configuration management for the API server
///
/// Loads an immutable configuration from environment variables once at
/// startup; nothing reads the process environment after this point.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: bind host (default: 0.0.0.0)
/// - `API_PORT`: bind port (default: 8080)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `SESSION_TOKEN_MINUTES`: session token lifetime (default: 60)
/// - `VERIFY_TOKEN_MINUTES`: email-verification token lifetime (default: 30)
/// - `GOOGLE_CLIENT_ID`: OAuth audience; unset enables the unauthenticated
///   development flow
/// - `PUBLIC_BASE_URL`: base for links embedded in emails
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
use serde::{Deserialize, Serialize};
use std::env;

use eventra_shared::auth::token::TokenConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub google: GoogleConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive (development)
    pub cors_origins: Vec<String>,

    /// Base URL used when building links sent to users
    pub public_base_url: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing secret; at least 32 characters.
    /// Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Session token lifetime in minutes
    pub session_token_minutes: i64,

    /// Email-verification token lifetime in minutes
    pub verify_token_minutes: i64,
}

/// Google OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client id used as the token audience.
    ///
    /// When absent the Google login endpoint accepts an email directly
    /// without provider verification; development only, and loudly logged.
    pub client_id: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let session_token_minutes = env::var("SESSION_TOKEN_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<i64>()?;

        let verify_token_minutes = env::var("VERIFY_TOKEN_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()?;

        let google_client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                public_base_url,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                session_token_minutes,
                verify_token_minutes,
            },
            google: GoogleConfig {
                client_id: google_client_id,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Builds the token signing configuration
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.auth.jwt_secret.clone()).with_lifetimes(
            chrono::Duration::minutes(self.auth.session_token_minutes),
            chrono::Duration::minutes(self.auth.verify_token_minutes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                public_base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                session_token_minutes: 60,
                verify_token_minutes: 30,
            },
            google: GoogleConfig { client_id: None },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_token_config_lifetimes() {
        let tokens = test_config().token_config();
        assert_eq!(tokens.session_ttl, chrono::Duration::minutes(60));
        assert_eq!(tokens.verify_ttl, chrono::Duration::minutes(30));
    }
}
