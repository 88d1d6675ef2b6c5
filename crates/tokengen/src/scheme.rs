//! Checksum schemes used to bind a token's fields together.
//!
//! A scheme turns the canonical token message and a salt into a fixed-size
//! checksum. The generator only relies on the [`ChecksumScheme`] capability;
//! concrete variants are picked once from configuration and never change for
//! the lifetime of a generator.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::TokenError;

/// Upper bound for salt and derived key lengths, in bytes.
pub const MAX_FIELD_SIZE: usize = 1024;

/// Capability consumed by the token engine.
pub trait ChecksumScheme: Send + Sync {
    /// Short identifier used in logs (e.g. `"pbkdf2_sha256"`).
    fn name(&self) -> &'static str;

    /// Number of random salt bytes stored in each token.
    fn salt_size(&self) -> usize;

    /// Number of checksum bytes stored in each token.
    fn checksum_size(&self) -> usize;

    /// Derives the checksum for `message` under `salt`.
    ///
    /// The output is always exactly [`checksum_size`](Self::checksum_size)
    /// bytes long.
    fn derive(&self, message: &[u8], salt: &[u8]) -> Result<Vec<u8>, TokenError>;
}

/// Hash function underlying a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Digest {
    Sha1,
    #[default]
    Sha256,
    Sha512,
}

impl Digest {
    /// Output size of the hash function in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Digest::Sha1 => 20,
            Digest::Sha256 => 32,
            Digest::Sha512 => 64,
        }
    }
}

/// PBKDF2-HMAC key derivation with a configurable work factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Scheme {
    digest: Digest,
    iterations: u32,
    salt_size: usize,
    key_length: usize,
}

impl Pbkdf2Scheme {
    pub const DEFAULT_ITERATIONS: u32 = 1000;
    pub const DEFAULT_SALT_SIZE: usize = 8;
    pub const DEFAULT_KEY_LENGTH: usize = 40;

    /// Creates a PBKDF2 scheme, rejecting unusable parameters.
    pub fn new(
        digest: Digest,
        iterations: u32,
        salt_size: usize,
        key_length: usize,
    ) -> Result<Self, TokenError> {
        if iterations == 0 {
            return Err(TokenError::Config(
                "pbkdf2 iterations must be at least 1".into(),
            ));
        }
        validate_size("salt size", salt_size)?;
        validate_size("key length", key_length)?;

        Ok(Self {
            digest,
            iterations,
            salt_size,
            key_length,
        })
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Scheme {
    fn default() -> Self {
        Self {
            digest: Digest::Sha256,
            iterations: Self::DEFAULT_ITERATIONS,
            salt_size: Self::DEFAULT_SALT_SIZE,
            key_length: Self::DEFAULT_KEY_LENGTH,
        }
    }
}

impl ChecksumScheme for Pbkdf2Scheme {
    fn name(&self) -> &'static str {
        match self.digest {
            Digest::Sha1 => "pbkdf2_sha1",
            Digest::Sha256 => "pbkdf2_sha256",
            Digest::Sha512 => "pbkdf2_sha512",
        }
    }

    fn salt_size(&self) -> usize {
        self.salt_size
    }

    fn checksum_size(&self) -> usize {
        self.key_length
    }

    fn derive(&self, message: &[u8], salt: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut out = vec![0u8; self.key_length];
        match self.digest {
            Digest::Sha1 => pbkdf2::pbkdf2_hmac::<Sha1>(message, salt, self.iterations, &mut out),
            Digest::Sha256 => {
                pbkdf2::pbkdf2_hmac::<Sha256>(message, salt, self.iterations, &mut out)
            }
            Digest::Sha512 => {
                pbkdf2::pbkdf2_hmac::<Sha512>(message, salt, self.iterations, &mut out)
            }
        }
        Ok(out)
    }
}

/// Single-pass HMAC keyed with the salt.
///
/// Much cheaper than PBKDF2. Suitable when the secret key already has high
/// entropy, which is the case for server-generated keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacScheme {
    digest: Digest,
    salt_size: usize,
}

impl HmacScheme {
    pub fn new(digest: Digest, salt_size: usize) -> Result<Self, TokenError> {
        validate_size("salt size", salt_size)?;
        Ok(Self { digest, salt_size })
    }
}

impl ChecksumScheme for HmacScheme {
    fn name(&self) -> &'static str {
        match self.digest {
            Digest::Sha1 => "hmac_sha1",
            Digest::Sha256 => "hmac_sha256",
            Digest::Sha512 => "hmac_sha512",
        }
    }

    fn salt_size(&self) -> usize {
        self.salt_size
    }

    fn checksum_size(&self) -> usize {
        self.digest.output_size()
    }

    fn derive(&self, message: &[u8], salt: &[u8]) -> Result<Vec<u8>, TokenError> {
        macro_rules! mac {
            ($hash:ty) => {{
                let mut mac = <Hmac<$hash> as Mac>::new_from_slice(salt)
                    .map_err(|e| TokenError::Scheme(e.to_string()))?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }};
        }

        let out = match self.digest {
            Digest::Sha1 => mac!(Sha1),
            Digest::Sha256 => mac!(Sha256),
            Digest::Sha512 => mac!(Sha512),
        };
        Ok(out)
    }
}

/// Scheme resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Pbkdf2(Pbkdf2Scheme),
    Hmac(HmacScheme),
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme::Pbkdf2(Pbkdf2Scheme::default())
    }
}

impl From<Pbkdf2Scheme> for Scheme {
    fn from(scheme: Pbkdf2Scheme) -> Self {
        Scheme::Pbkdf2(scheme)
    }
}

impl From<HmacScheme> for Scheme {
    fn from(scheme: HmacScheme) -> Self {
        Scheme::Hmac(scheme)
    }
}

impl ChecksumScheme for Scheme {
    fn name(&self) -> &'static str {
        match self {
            Scheme::Pbkdf2(s) => s.name(),
            Scheme::Hmac(s) => s.name(),
        }
    }

    fn salt_size(&self) -> usize {
        match self {
            Scheme::Pbkdf2(s) => s.salt_size(),
            Scheme::Hmac(s) => s.salt_size(),
        }
    }

    fn checksum_size(&self) -> usize {
        match self {
            Scheme::Pbkdf2(s) => s.checksum_size(),
            Scheme::Hmac(s) => s.checksum_size(),
        }
    }

    fn derive(&self, message: &[u8], salt: &[u8]) -> Result<Vec<u8>, TokenError> {
        match self {
            Scheme::Pbkdf2(s) => s.derive(message, salt),
            Scheme::Hmac(s) => s.derive(message, salt),
        }
    }
}

fn validate_size(what: &str, size: usize) -> Result<(), TokenError> {
    if size == 0 || size > MAX_FIELD_SIZE {
        return Err(TokenError::Config(format!(
            "{what} must be between 1 and {MAX_FIELD_SIZE} bytes, got {size}"
        )));
    }
    Ok(())
}
