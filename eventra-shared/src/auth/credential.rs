/// Password credential codec
///
/// Three credential formats coexist in the users table, and this module is
/// the single place that knows how to tell them apart:
///
/// - `bsha256$<bcrypt>`: current scheme, bcrypt over the SHA-256 digest of
///   the password. Pre-hashing removes bcrypt's 72-byte input ceiling, so
///   arbitrarily long passwords are fully significant.
/// - raw bcrypt (`$2a$` / `$2b$` / `$2y$` prefix): legacy rows; the raw
///   password is truncated to its first 72 bytes before verification,
///   matching how those hashes were originally produced.
/// - 32-character hex: legacy unsalted MD5 digests, stored as lowercase
///   hex. Comparison is exact, so an uppercase stored digest never
///   verifies.
///
/// New credentials are always written in the current scheme. Legacy rows are
/// upgraded opportunistically: [`maybe_upgrade`] returns a fresh current-format
/// credential whenever a login just proved knowledge of the raw password, and
/// the caller commits it. Verification itself never mutates anything.
///
/// # Example
///
/// ```
/// use eventra_shared::auth::credential::{hash_password, verify_password, maybe_upgrade};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stored = hash_password("correct horse battery staple")?;
/// assert!(stored.starts_with("bsha256$"));
/// assert!(verify_password("correct horse battery staple", &stored));
///
/// // Already on the current format: nothing to upgrade.
/// assert!(maybe_upgrade("correct horse battery staple", &stored)?.is_none());
/// # Ok(())
/// # }
/// ```
use md5::Md5;
use sha2::{Digest, Sha256};

/// Format tag for the current scheme: bcrypt(sha256(password)).
const BSHA256_PREFIX: &str = "bsha256$";

/// bcrypt work factor for newly created credentials.
const BCRYPT_COST: u32 = 12;

/// bcrypt's input-length ceiling; legacy raw-bcrypt rows were produced from
/// passwords truncated to this many bytes.
const BCRYPT_MAX_INPUT: usize = 72;

/// Error type for credential creation
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to compute the bcrypt hash
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

fn sha256_bytes(raw: &str) -> [u8; 32] {
    Sha256::digest(raw.as_bytes()).into()
}

fn md5_hex(raw: &str) -> String {
    hex::encode(Md5::digest(raw.as_bytes()))
}

fn is_bsha256(stored: &str) -> bool {
    stored.starts_with(BSHA256_PREFIX)
}

fn is_legacy_bcrypt(stored: &str) -> bool {
    stored.starts_with("$2a$") || stored.starts_with("$2b$") || stored.starts_with("$2y$")
}

fn is_md5_hex(stored: &str) -> bool {
    stored.len() == 32 && stored.chars().all(|c| c.is_ascii_hexdigit())
}

/// Hashes a password in the current format
///
/// Computes `bcrypt(sha256(password))` with a fixed work factor and prefixes
/// the result with the `bsha256$` format tag.
///
/// # Errors
///
/// Returns [`CredentialError::HashError`] if bcrypt fails (effectively only
/// on RNG failure).
pub fn hash_password(raw: &str) -> Result<String, CredentialError> {
    let digest = sha256_bytes(raw);
    let hashed = bcrypt::hash(digest, BCRYPT_COST)
        .map_err(|e| CredentialError::HashError(e.to_string()))?;

    Ok(format!("{}{}", BSHA256_PREFIX, hashed))
}

/// Verifies a password against a stored credential of any supported format
///
/// The stored format is detected by structural inspection (format tag, bcrypt
/// prefix, or 32-hex-character shape) and the matching comparison is applied.
/// Returns `false` when no format matches or the stored value is malformed;
/// a credential we cannot interpret is simply a failed login, not an error.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    // Current scheme: bcrypt over the SHA-256 digest.
    if is_bsha256(stored) {
        let hashed = &stored[BSHA256_PREFIX.len()..];
        return bcrypt::verify(sha256_bytes(raw), hashed).unwrap_or(false);
    }

    // Legacy raw bcrypt: truncate to 72 bytes, as the original hashes were.
    if is_legacy_bcrypt(stored) {
        let input = &raw.as_bytes()[..raw.len().min(BCRYPT_MAX_INPUT)];
        return bcrypt::verify(input, stored).unwrap_or(false);
    }

    // Legacy unsalted MD5, stored as lowercase hex. Exact comparison.
    if is_md5_hex(stored) {
        return md5_hex(raw) == stored;
    }

    false
}

/// Suggests an upgraded credential for legacy formats
///
/// Returns a freshly computed current-format credential when `stored` is a
/// legacy bcrypt or MD5 value, and `None` when it is already on the current
/// format (or unrecognized). This is a side-effect-free suggestion: the
/// caller is responsible for having verified `raw` first and for committing
/// the returned value.
///
/// # Errors
///
/// Returns [`CredentialError::HashError`] if computing the replacement fails.
pub fn maybe_upgrade(raw: &str, stored: &str) -> Result<Option<String>, CredentialError> {
    if is_bsha256(stored) {
        return Ok(None);
    }

    if is_legacy_bcrypt(stored) || is_md5_hex(stored) {
        return Ok(Some(hash_password(raw)?));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_bcrypt(raw: &str) -> String {
        let input = &raw.as_bytes()[..raw.len().min(BCRYPT_MAX_INPUT)];
        // Low cost keeps the test suite fast; format is identical.
        bcrypt::hash(input, 4).expect("bcrypt should succeed")
    }

    #[test]
    fn test_hash_password_format() {
        let stored = hash_password("password123").expect("hash should succeed");
        assert!(stored.starts_with("bsha256$"));
        // The embedded bcrypt hash carries its own prefix and parameters.
        assert!(stored["bsha256$".len()..].starts_with("$2"));
    }

    #[test]
    fn test_verify_roundtrip() {
        for raw in ["simple", "with spaces", "unicode-密码", ""] {
            let stored = hash_password(raw).expect("hash should succeed");
            assert!(verify_password(raw, &stored), "{:?} should verify", raw);
        }
    }

    #[test]
    fn test_verify_wrong_password() {
        let stored = hash_password("right").expect("hash should succeed");
        assert!(!verify_password("wrong", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").expect("hash should succeed");
        let b = hash_password("same").expect("hash should succeed");
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_password_fully_significant() {
        // Raw bcrypt would ignore everything past byte 72; the current scheme
        // must not.
        let base = "x".repeat(72);
        let long_a = format!("{}-suffix-a", base);
        let long_b = format!("{}-suffix-b", base);

        let stored = hash_password(&long_a).expect("hash should succeed");
        assert!(verify_password(&long_a, &stored));
        assert!(!verify_password(&long_b, &stored));
    }

    #[test]
    fn test_legacy_bcrypt_verifies() {
        let stored = legacy_bcrypt("old-password");
        assert!(verify_password("old-password", &stored));
        assert!(!verify_password("not-it", &stored));
    }

    #[test]
    fn test_legacy_bcrypt_truncates_at_72_bytes() {
        let base = "y".repeat(72);
        let stored = legacy_bcrypt(&format!("{}ignored", base));

        // Anything agreeing on the first 72 bytes verifies.
        assert!(verify_password(&format!("{}different-tail", base), &stored));
        assert!(verify_password(&base, &stored));
    }

    #[test]
    fn test_legacy_md5_verifies() {
        let stored = md5_hex("hunter2");
        assert_eq!(stored.len(), 32);
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_uppercase_md5_does_not_verify() {
        // Legacy rows hold lowercase hex; the comparison is exact.
        let stored = md5_hex("hunter2").to_ascii_uppercase();
        assert!(!verify_password("hunter2", &stored));
    }

    #[test]
    fn test_unrecognized_format_rejected() {
        assert!(!verify_password("anything", "plaintext-oops"));
        assert!(!verify_password("anything", ""));
        // 31 hex chars is not the MD5 shape.
        assert!(!verify_password("anything", &"a".repeat(31)));
    }

    #[test]
    fn test_upgrade_from_legacy_bcrypt() {
        let stored = legacy_bcrypt("migrate-me");
        let upgraded = maybe_upgrade("migrate-me", &stored)
            .expect("upgrade should succeed")
            .expect("legacy bcrypt should yield an upgrade");

        assert!(upgraded.starts_with("bsha256$"));
        assert!(verify_password("migrate-me", &upgraded));
    }

    #[test]
    fn test_upgrade_from_legacy_md5() {
        let stored = md5_hex("migrate-me-too");
        let upgraded = maybe_upgrade("migrate-me-too", &stored)
            .expect("upgrade should succeed")
            .expect("legacy MD5 should yield an upgrade");

        assert!(upgraded.starts_with("bsha256$"));
        assert!(verify_password("migrate-me-too", &upgraded));
    }

    #[test]
    fn test_no_upgrade_for_current_format() {
        let stored = hash_password("fresh").expect("hash should succeed");
        // Regardless of whether the password is even correct.
        assert!(maybe_upgrade("fresh", &stored).unwrap().is_none());
        assert!(maybe_upgrade("wrong", &stored).unwrap().is_none());
    }

    #[test]
    fn test_no_upgrade_for_unrecognized_format() {
        assert!(maybe_upgrade("anything", "garbage").unwrap().is_none());
    }
}
