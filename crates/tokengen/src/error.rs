//! Error types for token generation and verification.

/// Errors produced by the token engine.
///
/// `BadToken` and `InvalidToken` never escape the `check_token*` predicates;
/// they only surface through [`crate::TokenGenerator::expiry_time`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    BadToken(String),

    #[error("token checksum does not match")]
    InvalidToken,

    #[error("expiry {0} exceeds the maximum of {max}", max = crate::MAX_EXPIRES)]
    ExpiryOutOfRange(u64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("checksum scheme error: {0}")]
    Scheme(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
