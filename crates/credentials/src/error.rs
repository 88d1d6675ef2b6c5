//! Error types for credential operations.

use alcohol_tokengen::TokenError;

/// Errors produced while managing a credential holder.
///
/// Failed verifications are not errors; they are reported as `false`.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no password set")]
    NoPassword,

    #[error("no email address pending verification")]
    NoPendingEmail,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("invalid password context: {0}")]
    Config(String),

    #[error("token error: {0}")]
    Token(#[from] TokenError),
}
