//! Account credentials built on top of `alcohol-tokengen`.
//!
//! - **Passwords**: salted PHC hashes through a configurable
//!   [`PasswordContext`] (Argon2id or PBKDF2)
//! - **Password reset**: tokens bound to the current password hash
//! - **Email verification**: tokens bound to the address awaiting
//!   confirmation
//!
//! Storage is left to the caller: [`Credentials`] is a plain serializable
//! value.

pub mod error;
pub mod holder;
pub mod password;

pub use error::CredentialError;
pub use holder::{Credentials, DEFAULT_TOKEN_LIFETIME};
pub use password::PasswordContext;
