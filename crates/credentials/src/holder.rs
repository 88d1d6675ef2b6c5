//! Credential holder: password and email state for one account.
//!
//! The holder is a plain value that the caller's storage layer persists.
//! Token operations take the [`TokenGenerator`] explicitly so the secret key
//! never lives inside stored records.
//!
//! - Password-reset tokens are bound to the current password hash. Setting
//!   a new password invalidates every outstanding reset token.
//! - Email-activation tokens are bound to the pending address. Requesting a
//!   different address invalidates earlier activation tokens.

use std::time::Duration;

use alcohol_tokengen::{ChecksumScheme, TokenGenerator, now_unix};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CredentialError;
use crate::password::PasswordContext;

/// Default lifetime of reset and activation tokens (one day).
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24);

/// Password and email state of an account.
///
/// There is no way to read a password back; only its hash is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unverified_email: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a holder from stored fields.
    pub fn from_parts(
        password_hash: Option<String>,
        email: Option<String>,
        unverified_email: Option<String>,
    ) -> Self {
        Self {
            password_hash,
            email,
            unverified_email,
        }
    }

    /// Stored PHC hash, for persistence.
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    /// Verified email address.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Address awaiting confirmation.
    pub fn unverified_email(&self) -> Option<&str> {
        self.unverified_email.as_deref()
    }

    // --- Password ---

    /// Replaces the password. A new salt is generated every time.
    pub fn set_password(
        &mut self,
        ctx: &PasswordContext,
        new_password: &str,
    ) -> Result<(), CredentialError> {
        self.password_hash = Some(ctx.hash(new_password)?);
        debug!(algorithm = ctx.algorithm_id(), "password updated");
        Ok(())
    }

    /// Whether `candidate` matches the stored password.
    ///
    /// `false` if no password is set or the stored hash is unreadable.
    pub fn verify_password(&self, ctx: &PasswordContext, candidate: &str) -> bool {
        let Some(hash) = &self.password_hash else {
            return false;
        };
        match ctx.verify(candidate, hash) {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "stored password hash is unreadable");
                false
            }
        }
    }

    /// Verifies `candidate` and, if the stored hash uses outdated
    /// parameters, replaces it with a fresh one.
    ///
    /// Returns whether the password matched.
    pub fn verify_and_upgrade_password(
        &mut self,
        ctx: &PasswordContext,
        candidate: &str,
    ) -> Result<bool, CredentialError> {
        if !self.verify_password(ctx, candidate) {
            return Ok(false);
        }
        if self.password_hash.as_deref().is_some_and(|h| ctx.needs_rehash(h)) {
            self.set_password(ctx, candidate)?;
            debug!("password hash upgraded");
        }
        Ok(true)
    }

    // --- Password reset ---

    /// Issues a reset token valid for `valid_for`, bound to the current
    /// password hash.
    pub fn create_reset_password_token<S: ChecksumScheme>(
        &self,
        generator: &TokenGenerator<S>,
        valid_for: Duration,
    ) -> Result<String, CredentialError> {
        let hash = self
            .password_hash
            .as_deref()
            .ok_or(CredentialError::NoPassword)?;
        Ok(generator.generate_token_valid_for(valid_for, Some(hash.as_bytes()))?)
    }

    /// Whether `token` is a live reset token for the current password.
    pub fn check_password_reset_token<S: ChecksumScheme>(
        &self,
        generator: &TokenGenerator<S>,
        token: &str,
    ) -> bool {
        self.check_password_reset_token_at(generator, token, now_unix())
    }

    /// [`check_password_reset_token`](Self::check_password_reset_token) at
    /// Unix time `now`.
    pub fn check_password_reset_token_at<S: ChecksumScheme>(
        &self,
        generator: &TokenGenerator<S>,
        token: &str,
        now: i64,
    ) -> bool {
        match self.password_hash.as_deref() {
            Some(hash) => generator.check_token_at(token, Some(hash.as_bytes()), now),
            None => false,
        }
    }

    /// Sets a new password if `token` is a live reset token.
    ///
    /// Returns `Ok(false)` and leaves the password untouched when the token
    /// does not verify. The consumed token stops verifying afterwards.
    pub fn reset_password<S: ChecksumScheme>(
        &mut self,
        generator: &TokenGenerator<S>,
        ctx: &PasswordContext,
        token: &str,
        new_password: &str,
    ) -> Result<bool, CredentialError> {
        if !self.check_password_reset_token(generator, token) {
            return Ok(false);
        }
        self.set_password(ctx, new_password)?;
        Ok(true)
    }

    // --- Email ---

    /// Records `new_email` as awaiting confirmation.
    pub fn request_email_change(&mut self, new_email: impl Into<String>) {
        self.unverified_email = Some(new_email.into());
    }

    /// Issues an activation token for the pending address.
    pub fn create_email_activation_token<S: ChecksumScheme>(
        &self,
        generator: &TokenGenerator<S>,
        valid_for: Duration,
    ) -> Result<String, CredentialError> {
        let pending = self
            .unverified_email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(CredentialError::NoPendingEmail)?;
        Ok(generator.generate_token_valid_for(valid_for, Some(pending.as_bytes()))?)
    }

    /// Confirms the pending address if `token` verifies against it.
    ///
    /// On success the pending address becomes the verified one. On failure
    /// nothing changes.
    pub fn activate_email<S: ChecksumScheme>(
        &mut self,
        generator: &TokenGenerator<S>,
        token: &str,
    ) -> bool {
        self.activate_email_at(generator, token, now_unix())
    }

    /// [`activate_email`](Self::activate_email) at Unix time `now`.
    pub fn activate_email_at<S: ChecksumScheme>(
        &mut self,
        generator: &TokenGenerator<S>,
        token: &str,
        now: i64,
    ) -> bool {
        let Some(pending) = self.unverified_email.as_deref() else {
            return false;
        };
        if !generator.check_token_at(token, Some(pending.as_bytes()), now) {
            return false;
        }

        self.email = self.unverified_email.take();
        debug!("email address verified");
        true
    }
}
