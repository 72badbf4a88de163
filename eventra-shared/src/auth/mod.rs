/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`credential`]: password hashing and verification across the three
///   coexisting stored formats, with opportunistic upgrade
/// - [`token`]: HS256 session and email-verification tokens, distinguished
///   by an explicit purpose claim
/// - [`guard`]: membership-based authorization gates for organizer-scoped
///   operations
///
/// # Example
///
/// ```no_run
/// use eventra_shared::auth::credential::{hash_password, verify_password};
/// use eventra_shared::auth::token::{TokenConfig, issue_session};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stored = hash_password("user_password")?;
/// assert!(verify_password("user_password", &stored));
///
/// let config = TokenConfig::new("a-secret-of-at-least-32-bytes-long");
/// let token = issue_session(&config, 42, "user")?;
/// # Ok(())
/// # }
/// ```
pub mod credential;
pub mod guard;
pub mod token;
