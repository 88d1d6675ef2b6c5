//! Password hashing and verification.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`, `$pbkdf2-sha256$i=...`)
//! carrying their own algorithm, parameters and salt. A fresh salt is drawn
//! for every hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Version};
use pbkdf2::Pbkdf2;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Hashing algorithm and cost used for new password hashes.
///
/// Verification accepts hashes from any supported algorithm, so the
/// configured algorithm can change without invalidating stored passwords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum PasswordContext {
    Argon2id { m_cost: u32, t_cost: u32, p_cost: u32 },
    Pbkdf2Sha256 { rounds: u32 },
    Pbkdf2Sha512 { rounds: u32 },
}

impl Default for PasswordContext {
    fn default() -> Self {
        PasswordContext::Argon2id {
            m_cost: argon2::Params::DEFAULT_M_COST,
            t_cost: argon2::Params::DEFAULT_T_COST,
            p_cost: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordContext {
    /// PHC identifier of the configured algorithm.
    pub fn algorithm_id(&self) -> &'static str {
        match self {
            PasswordContext::Argon2id { .. } => "argon2id",
            PasswordContext::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            PasswordContext::Pbkdf2Sha512 { .. } => "pbkdf2-sha512",
        }
    }

    /// Hashes `password` with a freshly generated salt.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = match *self {
            PasswordContext::Argon2id {
                m_cost,
                t_cost,
                p_cost,
            } => {
                let params = argon2::Params::new(m_cost, t_cost, p_cost, None)
                    .map_err(|e| CredentialError::Config(e.to_string()))?;
                Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password(password.as_bytes(), &salt)
            }
            PasswordContext::Pbkdf2Sha256 { rounds } => {
                pbkdf2_hash(password, pbkdf2::Algorithm::Pbkdf2Sha256, rounds, 32, &salt)?
            }
            PasswordContext::Pbkdf2Sha512 { rounds } => {
                pbkdf2_hash(password, pbkdf2::Algorithm::Pbkdf2Sha512, rounds, 64, &salt)?
            }
        };

        hash.map(|h| h.to_string())
            .map_err(|e| CredentialError::PasswordHash(e.to_string()))
    }

    /// Verifies `password` against a stored PHC string.
    ///
    /// Returns an error only if `hash` is not a parseable PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| CredentialError::PasswordHash(format!("invalid hash format: {e}")))?;

        let argon2 = Argon2::default();
        let verifiers: [&dyn PasswordVerifier; 2] = [&argon2, &Pbkdf2];
        Ok(parsed.verify_password(&verifiers, password).is_ok())
    }

    /// Whether `hash` was produced with a different algorithm or cost than
    /// this context would use now. Unparseable hashes always need a rehash.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm.as_str() != self.algorithm_id() {
            return true;
        }

        let param = |name: &str| parsed.params.get_decimal(name);
        match *self {
            PasswordContext::Argon2id {
                m_cost,
                t_cost,
                p_cost,
            } => {
                param("m") != Some(m_cost) || param("t") != Some(t_cost) || param("p") != Some(p_cost)
            }
            PasswordContext::Pbkdf2Sha256 { rounds } | PasswordContext::Pbkdf2Sha512 { rounds } => {
                param("i") != Some(rounds)
            }
        }
    }
}

fn pbkdf2_hash<'a>(
    password: &str,
    algorithm: pbkdf2::Algorithm,
    rounds: u32,
    output_length: usize,
    salt: &'a SaltString,
) -> Result<argon2::password_hash::Result<PasswordHash<'a>>, CredentialError> {
    if rounds == 0 {
        return Err(CredentialError::Config(
            "pbkdf2 rounds must be at least 1".into(),
        ));
    }

    let params = pbkdf2::Params {
        rounds,
        output_length,
    };
    Ok(Pbkdf2.hash_password_customized(
        password.as_bytes(),
        Some(algorithm.ident()),
        None,
        params,
        salt,
    ))
}
