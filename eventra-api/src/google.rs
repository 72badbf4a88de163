/// Google identity verification
///
/// Verifies a provider-issued `id_token` against Google's `tokeninfo`
/// endpoint and checks the audience matches the configured client id. The
/// development fallback (no client id configured) lives in the auth route,
/// not here; this module only knows the verified path.
use serde::Deserialize;

use crate::error::ApiError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Identity fields extracted from a verified Google token
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Provider subject identifier, stable per account
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Verifies an id_token with Google and returns the asserted identity
///
/// # Errors
///
/// - `Unauthorized` when Google rejects the token, the audience does not
///   match, or the email is unverified on the provider side
/// - `InternalError` when the verification call itself fails
pub async fn verify_id_token(
    client: &reqwest::Client,
    id_token: &str,
    expected_client_id: &str,
) -> Result<GoogleIdentity, ApiError> {
    let response = client
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| ApiError::InternalError(format!("Token verification call failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(ApiError::Unauthorized(
            "Google rejected the identity token".to_string(),
        ));
    }

    let info: TokenInfoResponse = response
        .json()
        .await
        .map_err(|e| ApiError::InternalError(format!("Malformed tokeninfo response: {}", e)))?;

    if info.aud != expected_client_id {
        return Err(ApiError::Unauthorized(
            "Identity token issued for a different application".to_string(),
        ));
    }

    if info.email_verified.as_deref() != Some("true") {
        return Err(ApiError::Unauthorized(
            "Google account email is not verified".to_string(),
        ));
    }

    Ok(GoogleIdentity {
        subject: info.sub,
        email: info.email,
        name: info.name,
        picture: info.picture,
    })
}
