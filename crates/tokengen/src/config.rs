//! Generator configuration.
//!
//! Reads JSON such as:
//!
//! ```json
//! {
//!   "scheme": { "type": "pbkdf2", "digest": "sha256", "iterations": 1000 },
//!   "encoding": "url_safe"
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::scheme::{Digest, HmacScheme, Pbkdf2Scheme, Scheme};
use crate::TokenEncoding;

/// Serializable scheme selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemeConfig {
    Pbkdf2 {
        #[serde(default)]
        digest: Digest,
        #[serde(default = "default_iterations")]
        iterations: u32,
        #[serde(default = "default_salt_size")]
        salt_size: usize,
        #[serde(default = "default_key_length")]
        key_length: usize,
    },
    Hmac {
        #[serde(default)]
        digest: Digest,
        #[serde(default = "default_hmac_salt_size")]
        salt_size: usize,
    },
}

fn default_iterations() -> u32 {
    Pbkdf2Scheme::DEFAULT_ITERATIONS
}

fn default_salt_size() -> usize {
    Pbkdf2Scheme::DEFAULT_SALT_SIZE
}

fn default_key_length() -> usize {
    Pbkdf2Scheme::DEFAULT_KEY_LENGTH
}

fn default_hmac_salt_size() -> usize {
    16
}

impl Default for SchemeConfig {
    fn default() -> Self {
        SchemeConfig::Pbkdf2 {
            digest: Digest::default(),
            iterations: default_iterations(),
            salt_size: default_salt_size(),
            key_length: default_key_length(),
        }
    }
}

impl SchemeConfig {
    /// Resolves the configuration into a concrete scheme.
    pub fn build(&self) -> Result<Scheme, TokenError> {
        let scheme = match *self {
            SchemeConfig::Pbkdf2 {
                digest,
                iterations,
                salt_size,
                key_length,
            } => Pbkdf2Scheme::new(digest, iterations, salt_size, key_length)?.into(),
            SchemeConfig::Hmac { digest, salt_size } => HmacScheme::new(digest, salt_size)?.into(),
        };
        Ok(scheme)
    }
}

/// Token generator settings, minus the secret key.
///
/// The secret key is supplied separately and never read from or written to
/// configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub scheme: SchemeConfig,
    pub encoding: TokenEncoding,
}

impl TokenConfig {
    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TokenError> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        tracing::debug!(path = %path.display(), "loaded token configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::ChecksumScheme;

    #[test]
    fn empty_object_uses_defaults() {
        let config = TokenConfig::from_json("{}").unwrap();
        assert_eq!(config, TokenConfig::default());
        assert_eq!(config.encoding, TokenEncoding::Hex);

        let scheme = config.scheme.build().unwrap();
        assert_eq!(scheme.name(), "pbkdf2_sha256");
        assert_eq!(scheme.salt_size(), 8);
        assert_eq!(scheme.checksum_size(), 40);
    }

    #[test]
    fn partial_pbkdf2_config() {
        let config = TokenConfig::from_json(
            r#"{"scheme": {"type": "pbkdf2", "digest": "sha512", "iterations": 5}, "encoding": "url_safe"}"#,
        )
        .unwrap();
        assert_eq!(config.encoding, TokenEncoding::UrlSafe);
        assert_eq!(
            config.scheme,
            SchemeConfig::Pbkdf2 {
                digest: Digest::Sha512,
                iterations: 5,
                salt_size: 8,
                key_length: 40,
            }
        );
    }

    #[test]
    fn hmac_config() {
        let config =
            TokenConfig::from_json(r#"{"scheme": {"type": "hmac", "digest": "sha1"}}"#).unwrap();
        let scheme = config.scheme.build().unwrap();
        assert_eq!(scheme.name(), "hmac_sha1");
        assert_eq!(scheme.salt_size(), 16);
        assert_eq!(scheme.checksum_size(), 20);
    }

    #[test]
    fn invalid_parameters_fail_to_build() {
        let config =
            TokenConfig::from_json(r#"{"scheme": {"type": "pbkdf2", "iterations": 0}}"#).unwrap();
        assert!(matches!(config.scheme.build(), Err(TokenError::Config(_))));
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let result = TokenConfig::from_json(r#"{"scheme": {"type": "md5"}}"#);
        assert!(matches!(result, Err(TokenError::Json(_))));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");
        std::fs::write(&path, r#"{"encoding": "url_safe"}"#).unwrap();

        let config = TokenConfig::load(&path).unwrap();
        assert_eq!(config.encoding, TokenEncoding::UrlSafe);
        assert_eq!(config.scheme, SchemeConfig::default());
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = TokenConfig::load(&tmp.path().join("missing.json"));
        assert!(matches!(result, Err(TokenError::Io(_))));
    }

    #[test]
    fn serialize_roundtrip() {
        let config = TokenConfig {
            scheme: SchemeConfig::Hmac {
                digest: Digest::Sha256,
                salt_size: 24,
            },
            encoding: TokenEncoding::UrlSafe,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TokenConfig::from_json(&json).unwrap(), config);
    }
}
