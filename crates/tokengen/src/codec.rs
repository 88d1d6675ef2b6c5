//! Token layout and textual encodings.
//!
//! # Layout
//!
//! ```text
//! [salt_size bytes: random salt]
//! [8 bytes BE: expires, i64 Unix timestamp or -1 for "never"]
//! [checksum_size bytes: checksum]
//! ```
//!
//! The raw token is then rendered as text, either lowercase hex or URL-safe
//! base64 without padding. Both renderings have a length fixed by the layout,
//! so garbage input is rejected before any checksum work.
//!
//! Nothing in this module touches the checksum scheme.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Largest expiry timestamp that fits the wire field (`2^63 - 1`).
pub const MAX_EXPIRES: u64 = i64::MAX as u64;

/// Size of the expiry field in bytes.
pub const EXPIRES_SIZE: usize = 8;

/// Wire value marking a token that never expires.
const NEVER_EXPIRES: i64 = -1;

/// When a token stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// The token is valid until its bound value or the secret key changes.
    Never,
    /// Unix timestamp (seconds). The token is valid while `now < t`.
    At(u64),
}

impl Expiry {
    /// Converts to the signed wire value, rejecting timestamps past
    /// [`MAX_EXPIRES`].
    pub fn to_wire(self) -> Result<i64, TokenError> {
        match self {
            Expiry::Never => Ok(NEVER_EXPIRES),
            Expiry::At(t) => i64::try_from(t).map_err(|_| TokenError::ExpiryOutOfRange(t)),
        }
    }

    /// Parses the signed wire value. Negative values other than `-1` are
    /// structurally invalid.
    pub fn from_wire(value: i64) -> Result<Self, TokenError> {
        match value {
            NEVER_EXPIRES => Ok(Expiry::Never),
            v if v >= 0 => Ok(Expiry::At(v as u64)),
            v => Err(TokenError::BadToken(format!("invalid expiry field: {v}"))),
        }
    }

    /// Whether the token is expired at Unix time `now`.
    ///
    /// The boundary instant counts as expired.
    pub fn is_expired_at(self, now: i64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(t) => now >= 0 && now as u64 >= t,
        }
    }
}

/// Fields of an unpacked token, borrowed from the raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub salt: &'a [u8],
    pub expires: Expiry,
    pub checksum: &'a [u8],
}

/// Fixed field offsets for a given scheme configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLayout {
    salt_size: usize,
    checksum_size: usize,
}

impl TokenLayout {
    pub fn new(salt_size: usize, checksum_size: usize) -> Self {
        Self {
            salt_size,
            checksum_size,
        }
    }

    /// Total raw token length in bytes.
    pub fn len(&self) -> usize {
        self.salt_size + EXPIRES_SIZE + self.checksum_size
    }

    pub fn salt_size(&self) -> usize {
        self.salt_size
    }

    pub fn checksum_size(&self) -> usize {
        self.checksum_size
    }

    /// Concatenates the three fields into a raw token.
    pub fn pack(&self, salt: &[u8], expires: Expiry, checksum: &[u8]) -> Result<Vec<u8>, TokenError> {
        if salt.len() != self.salt_size {
            return Err(TokenError::BadToken(format!(
                "salt must be {} bytes, got {}",
                self.salt_size,
                salt.len()
            )));
        }
        if checksum.len() != self.checksum_size {
            return Err(TokenError::BadToken(format!(
                "checksum must be {} bytes, got {}",
                self.checksum_size,
                checksum.len()
            )));
        }

        let mut buf = Vec::with_capacity(self.len());
        buf.extend_from_slice(salt);
        buf.extend_from_slice(&expires.to_wire()?.to_be_bytes());
        buf.extend_from_slice(checksum);
        Ok(buf)
    }

    /// Splits a raw token into its fields.
    pub fn unpack<'a>(&self, raw: &'a [u8]) -> Result<RawToken<'a>, TokenError> {
        if raw.len() != self.len() {
            return Err(TokenError::BadToken(format!(
                "token must be {} bytes, got {}",
                self.len(),
                raw.len()
            )));
        }

        let (salt, rest) = raw.split_at(self.salt_size);
        let (expires, checksum) = rest.split_at(EXPIRES_SIZE);

        let mut field = [0u8; EXPIRES_SIZE];
        field.copy_from_slice(expires);
        let expires = Expiry::from_wire(i64::from_be_bytes(field))?;

        Ok(RawToken {
            salt,
            expires,
            checksum,
        })
    }
}

/// Textual rendering of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEncoding {
    /// Lowercase hexadecimal.
    #[default]
    Hex,
    /// RFC 4648 URL-safe base64 with padding stripped.
    UrlSafe,
}

impl TokenEncoding {
    /// Exact text length for a raw token of `raw_len` bytes.
    pub fn encoded_len(self, raw_len: usize) -> usize {
        match self {
            TokenEncoding::Hex => raw_len * 2,
            TokenEncoding::UrlSafe => (raw_len * 4).div_ceil(3),
        }
    }

    pub fn encode(self, raw: &[u8]) -> String {
        match self {
            TokenEncoding::Hex => hex::encode(raw),
            TokenEncoding::UrlSafe => URL_SAFE_NO_PAD.encode(raw),
        }
    }

    /// Decodes text produced by [`encode`](Self::encode).
    ///
    /// Only the canonical form is accepted: uppercase hex digits, `=`
    /// padding and base64 strings with non-zero trailing bits are rejected.
    /// The padding a URL-safe string would carry is implied by its length
    /// modulo 4.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, TokenError> {
        match self {
            TokenEncoding::Hex => {
                if let Some(c) = text
                    .chars()
                    .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
                {
                    return Err(TokenError::BadToken(format!(
                        "invalid hex character {c:?}"
                    )));
                }
                hex::decode(text).map_err(|e| TokenError::BadToken(e.to_string()))
            }
            TokenEncoding::UrlSafe => URL_SAFE_NO_PAD
                .decode(text)
                .map_err(|e| TokenError::BadToken(e.to_string())),
        }
    }
}
