/// Signed token issuing and verification
///
/// Tokens are compact HS256-signed assertions of identity. Two flavors exist,
/// structurally identical but semantically distinct:
///
/// - **Session tokens** (default 60 minutes) carry the caller's platform role
///   and back every authenticated request.
/// - **Email-verification tokens** (default 30 minutes) are embedded in
///   mailed links and prove nothing beyond ownership of the address.
///
/// Both flavors share one signing secret, so every token embeds an explicit
/// `purpose` claim and each verifier rejects the other flavor. A
/// verification-link token presented as a bearer credential fails as
/// `Invalid` before any identity is resolved.
///
/// All signing parameters live in [`TokenConfig`], constructed once at
/// startup and passed in explicitly; nothing here reads ambient process
/// state.
///
/// # Example
///
/// ```
/// use eventra_shared::auth::token::{TokenConfig, issue_session, verify_session};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TokenConfig::new("a-secret-of-at-least-32-bytes-long");
///
/// let token = issue_session(&config, 42, "user")?;
/// let claims = verify_session(&config, &token)?;
/// assert_eq!(claims.user_id()?, 42);
/// assert_eq!(claims.role.as_deref(), Some("user"));
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token is past its expiry timestamp
    #[error("Token has expired")]
    Expired,

    /// Signature, structure, or purpose does not check out
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// What a token is allowed to be used for
///
/// Checked by every verifier; a token minted for one purpose is never
/// accepted for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Bearer credential for authenticated requests
    Session,

    /// One-shot email-verification link
    EmailVerify,
}

/// Signing configuration, constructed once at startup
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret (should be at least 32 bytes)
    pub secret: String,

    /// Session token lifetime
    pub session_ttl: Duration,

    /// Email-verification token lifetime
    pub verify_ttl: Duration,
}

impl TokenConfig {
    /// Creates a config with the default lifetimes (60 and 30 minutes)
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            session_ttl: Duration::minutes(60),
            verify_ttl: Duration::minutes(30),
        }
    }

    /// Overrides both lifetimes, for configuration or tests
    pub fn with_lifetimes(mut self, session_ttl: Duration, verify_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self.verify_ttl = verify_ttl;
        self
    }
}

/// Decoded token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id, string-encoded
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// What the token may be used for
    pub purpose: TokenPurpose,

    /// Platform role (session tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Parses the string-encoded subject back into a user id
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Invalid(format!("Malformed subject claim: {}", self.sub)))
    }
}

fn sign(config: &TokenConfig, claims: &Claims) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(config.secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Issues a session token for a user
///
/// Embeds the user id (string-encoded), the platform role, and an expiry of
/// now + `session_ttl`.
pub fn issue_session(config: &TokenConfig, user_id: i64, role: &str) -> Result<String, TokenError> {
    let now = Utc::now();
    sign(
        config,
        &Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + config.session_ttl).timestamp(),
            purpose: TokenPurpose::Session,
            role: Some(role.to_string()),
        },
    )
}

/// Issues an email-verification token for a user
///
/// Carries no role; expires after `verify_ttl`.
pub fn issue_email_verify(config: &TokenConfig, user_id: i64) -> Result<String, TokenError> {
    let now = Utc::now();
    sign(
        config,
        &Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + config.verify_ttl).timestamp(),
            purpose: TokenPurpose::EmailVerify,
            role: None,
        },
    )
}

fn verify(config: &TokenConfig, token: &str, purpose: TokenPurpose) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // Exact expiry semantics; the default 60s leeway would mask short TTLs.
    validation.leeway = 0;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })?;

    if data.claims.purpose != purpose {
        return Err(TokenError::Invalid(format!(
            "Token purpose mismatch: expected {:?}",
            purpose
        )));
    }

    Ok(data.claims)
}

/// Verifies a session token and returns its claims
///
/// # Errors
///
/// - [`TokenError::Expired`] past the expiry timestamp
/// - [`TokenError::Invalid`] on a bad signature, malformed structure, or a
///   token minted for another purpose
pub fn verify_session(config: &TokenConfig, token: &str) -> Result<Claims, TokenError> {
    verify(config, token, TokenPurpose::Session)
}

/// Verifies an email-verification token and returns its claims
pub fn verify_email_token(config: &TokenConfig, token: &str) -> Result<Claims, TokenError> {
    verify(config, token, TokenPurpose::EmailVerify)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig::new("test-secret-key-at-least-32-bytes-long")
    }

    #[test]
    fn test_issue_and_verify_session() {
        let config = test_config();
        let token = issue_session(&config, 42, "user").expect("should issue");

        let claims = verify_session(&config, &token).expect("should verify");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role.as_deref(), Some("user"));
        assert_eq!(claims.purpose, TokenPurpose::Session);
    }

    #[test]
    fn test_claims_survive_roundtrip_unchanged() {
        let config = test_config();
        let token = issue_session(&config, 7, "platform_admin").expect("should issue");
        let claims = verify_session(&config, &token).expect("should verify");

        assert_eq!(claims.role.as_deref(), Some("platform_admin"));
        assert!(claims.exp > claims.iat);
        assert_eq!(
            claims.exp - claims.iat,
            config.session_ttl.num_seconds()
        );
    }

    #[test]
    fn test_expired_session_fails_with_expired() {
        let config = test_config().with_lifetimes(Duration::seconds(-60), Duration::seconds(-60));
        let token = issue_session(&config, 1, "user").expect("should issue");

        let err = verify_session(&config, &token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_fails_with_invalid() {
        let config = test_config();
        let token = issue_session(&config, 1, "user").expect("should issue");

        let other = TokenConfig::new("another-secret-also-32-bytes-long!!");
        let err = verify_session(&other, &token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_tampered_token_fails_with_invalid() {
        let config = test_config();
        let token = issue_session(&config, 1, "user").expect("should issue");

        // Flip one character of the signature segment.
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let err = verify_session(&config, &tampered).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_verify_token_not_accepted_as_session() {
        let config = test_config();
        let token = issue_email_verify(&config, 1).expect("should issue");

        let err = verify_session(&config, &token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_session_token_not_accepted_for_email_verify() {
        let config = test_config();
        let token = issue_session(&config, 1, "user").expect("should issue");

        let err = verify_email_token(&config, &token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_email_verify_token_roundtrip() {
        let config = test_config();
        let token = issue_email_verify(&config, 99).expect("should issue");

        let claims = verify_email_token(&config, &token).expect("should verify");
        assert_eq!(claims.user_id().unwrap(), 99);
        assert!(claims.role.is_none());
        assert_eq!(
            claims.exp - claims.iat,
            config.verify_ttl.num_seconds()
        );
    }

    #[test]
    fn test_malformed_subject_rejected_on_parse() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            iat: 0,
            exp: 0,
            purpose: TokenPurpose::Session,
            role: None,
        };
        assert!(matches!(claims.user_id(), Err(TokenError::Invalid(_))));
    }
}
