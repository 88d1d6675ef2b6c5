//! Signed, salted, expiring tokens.
//!
//! A token carries a random salt, an expiry and a checksum over
//! `(expiry, bound value, secret key)`. Nothing else is stored: the bound
//! value (a password hash, a pending email address, ...) is supplied again
//! at verification time, so a token stops verifying as soon as that value
//! changes. No revocation list is needed.
//!
//! ```no_run
//! use alcohol_tokengen::{Expiry, Scheme, TokenGenerator};
//!
//! let generator = TokenGenerator::new(b"server secret".to_vec(), Scheme::default())?;
//! let token = generator.generate_token(Expiry::Never, Some(b"$argon2id$..."))?;
//! assert!(generator.check_token(&token, Some(b"$argon2id$...")));
//! # Ok::<(), alcohol_tokengen::TokenError>(())
//! ```
//!
//! # Wire format
//!
//! See the [`codec`] module for the binary layout and text encodings.

pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod generator;
pub mod scheme;

pub use codec::{Expiry, MAX_EXPIRES, TokenEncoding, TokenLayout};
pub use compare::constant_time_eq;
pub use config::{SchemeConfig, TokenConfig};
pub use error::TokenError;
pub use generator::{TokenGenerator, now_unix};
pub use scheme::{ChecksumScheme, Digest, HmacScheme, Pbkdf2Scheme, Scheme};
