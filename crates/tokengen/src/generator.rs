//! Token generation and verification.

use std::fmt;
use std::time::Duration;

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

use crate::codec::{Expiry, TokenEncoding, TokenLayout};
use crate::compare::constant_time_eq;
use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::scheme::{ChecksumScheme, Scheme};

/// Current Unix time in seconds.
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Issues and checks tokens bound to a secret key.
///
/// A generator is immutable after construction and can be shared between
/// threads. The checksum of every token covers the expiry, the caller's
/// bound value and the secret key, so a token only verifies under the same
/// key and the same bound value, and its expiry cannot be edited.
pub struct TokenGenerator<S = Scheme> {
    secret_key: Vec<u8>,
    scheme: S,
    encoding: TokenEncoding,
    layout: TokenLayout,
}

impl TokenGenerator<Scheme> {
    /// Builds a generator from a configuration file's settings.
    pub fn from_config(
        secret_key: impl Into<Vec<u8>>,
        config: &TokenConfig,
    ) -> Result<Self, TokenError> {
        let scheme = config.scheme.build()?;
        Ok(Self::new(secret_key, scheme)?.with_encoding(config.encoding))
    }
}

impl<S: ChecksumScheme> TokenGenerator<S> {
    /// Creates a hex-encoding generator.
    pub fn new(secret_key: impl Into<Vec<u8>>, scheme: S) -> Result<Self, TokenError> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            return Err(TokenError::Config("secret key must not be empty".into()));
        }

        let layout = TokenLayout::new(scheme.salt_size(), scheme.checksum_size());
        debug!(
            scheme = scheme.name(),
            raw_len = layout.len(),
            "token generator created"
        );

        Ok(Self {
            secret_key,
            scheme,
            encoding: TokenEncoding::Hex,
            layout,
        })
    }

    /// Switches the textual encoding, e.g. to [`TokenEncoding::UrlSafe`] for
    /// tokens embedded in links.
    pub fn with_encoding(mut self, encoding: TokenEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> TokenEncoding {
        self.encoding
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Exact length of every token this generator produces.
    pub fn token_length(&self) -> usize {
        self.encoding.encoded_len(self.layout.len())
    }

    /// Issues a new token.
    ///
    /// Fails only on configuration errors: an expiry past
    /// [`MAX_EXPIRES`](crate::MAX_EXPIRES) or a failing random source.
    pub fn generate_token(
        &self,
        expires: Expiry,
        bound_value: Option<&[u8]>,
    ) -> Result<String, TokenError> {
        expires.to_wire()?;

        let mut salt = vec![0u8; self.layout.salt_size()];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| TokenError::Scheme(format!("random source failure: {e}")))?;

        let checksum = self.checksum(&salt, expires, bound_value)?;
        let raw = self.layout.pack(&salt, expires, &checksum)?;

        debug!(scheme = self.scheme.name(), ?expires, "issued token");
        Ok(self.encoding.encode(&raw))
    }

    /// Issues a token that expires `valid_for` from now.
    pub fn generate_token_valid_for(
        &self,
        valid_for: Duration,
        bound_value: Option<&[u8]>,
    ) -> Result<String, TokenError> {
        let now = u64::try_from(now_unix()).unwrap_or(0);
        let expires = now
            .checked_add(valid_for.as_secs())
            .ok_or(TokenError::ExpiryOutOfRange(u64::MAX))?;
        self.generate_token(Expiry::At(expires), bound_value)
    }

    /// Checks structure and checksum, returning the expiry without comparing
    /// it to the clock.
    ///
    /// Returns [`TokenError::BadToken`] for input that can never be a token
    /// of this generator and [`TokenError::InvalidToken`] for a well-formed
    /// token whose checksum does not match.
    pub fn expiry_time(
        &self,
        token: &str,
        bound_value: Option<&[u8]>,
    ) -> Result<Expiry, TokenError> {
        if token.len() != self.token_length() {
            return Err(TokenError::BadToken(format!(
                "token must be {} characters, got {}",
                self.token_length(),
                token.len()
            )));
        }

        let raw = self.encoding.decode(token)?;
        let parts = self.layout.unpack(&raw)?;

        let expected = self.checksum(parts.salt, parts.expires, bound_value)?;
        if !constant_time_eq(&expected, parts.checksum) {
            return Err(TokenError::InvalidToken);
        }

        Ok(parts.expires)
    }

    /// Whether `token` is valid for `bound_value` right now.
    pub fn check_token(&self, token: &str, bound_value: Option<&[u8]>) -> bool {
        self.check_token_at(token, bound_value, now_unix())
    }

    /// Whether `token` is valid for `bound_value` at Unix time `now`.
    ///
    /// Never fails: malformed, forged and expired tokens all yield `false`.
    pub fn check_token_at(&self, token: &str, bound_value: Option<&[u8]>, now: i64) -> bool {
        match self.expiry_time(token, bound_value) {
            Ok(expires) if expires.is_expired_at(now) => {
                debug!(?expires, now, "token expired");
                false
            }
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "token rejected");
                false
            }
        }
    }

    /// Serializes `[expires, hex(bound_value) | null, hex(secret_key)]`.
    ///
    /// `None` becomes `null` and `Some(b"")` becomes `""`.
    fn message(&self, expires: Expiry, bound_value: Option<&[u8]>) -> Result<Vec<u8>, TokenError> {
        let fields = (
            expires.to_wire()?,
            bound_value.map(hex::encode),
            hex::encode(&self.secret_key),
        );
        Ok(serde_json::to_vec(&fields)?)
    }

    fn checksum(
        &self,
        salt: &[u8],
        expires: Expiry,
        bound_value: Option<&[u8]>,
    ) -> Result<Vec<u8>, TokenError> {
        let message = self.message(expires, bound_value)?;
        let checksum = self.scheme.derive(&message, salt)?;
        if checksum.len() != self.layout.checksum_size() {
            return Err(TokenError::Scheme(format!(
                "{} produced {} bytes, expected {}",
                self.scheme.name(),
                checksum.len(),
                self.layout.checksum_size()
            )));
        }
        Ok(checksum)
    }
}

impl<S: Clone> Clone for TokenGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            secret_key: self.secret_key.clone(),
            scheme: self.scheme.clone(),
            encoding: self.encoding,
            layout: self.layout,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for TokenGenerator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("secret_key", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("encoding", &self.encoding)
            .finish()
    }
}
