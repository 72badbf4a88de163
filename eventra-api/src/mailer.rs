/// Outbound mail seam
///
/// Actual delivery goes through an external mail provider that is not part
/// of this service; this module is the single place the rest of the code
/// hands a message to. The current implementation logs the link so the flow
/// is fully exercisable in development without an SMTP account.
use tracing::info;

/// Hands a verification link off for delivery to the given address
pub fn send_verification_email(email: &str, verification_link: &str) {
    info!(
        recipient = %email,
        link = %verification_link,
        "Dispatching email-verification message"
    );
}
