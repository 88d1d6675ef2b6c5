//! Subcommand handlers.
//!
//! Handlers write their results to `out` and return whether the command
//! succeeded, so `main` can map a failed check to a non-zero exit code.

use std::io::Write;
use std::time::Duration;

use alcohol_credentials::PasswordContext;
use alcohol_tokengen::{Expiry, TokenConfig, TokenEncoding, TokenError, TokenGenerator, now_unix};
use anyhow::Context;

use crate::cli::{Algorithm, GeneratorArgs, PasswordCommand, TokenCommand};

/// PBKDF2 rounds used for new hashes from the command line.
const PBKDF2_ROUNDS: u32 = 600_000;

/// Builds a generator from the config file (if any) and flags.
pub fn build_generator(args: &GeneratorArgs) -> anyhow::Result<TokenGenerator> {
    let mut config = match &args.config {
        Some(path) => TokenConfig::load(path)
            .with_context(|| format!("failed to load token config {}", path.display()))?,
        None => TokenConfig::default(),
    };
    if args.url_safe {
        config.encoding = TokenEncoding::UrlSafe;
    }

    let generator = TokenGenerator::from_config(args.secret_key.as_bytes(), &config)?;
    Ok(generator)
}

pub fn run_token(cmd: &TokenCommand, out: &mut impl Write) -> anyhow::Result<bool> {
    match cmd {
        TokenCommand::Generate {
            generator,
            valid_for,
            bound_value,
        } => {
            let generator = build_generator(generator)?;
            let bound = bound_value.as_deref().map(str::as_bytes);
            let token = match valid_for {
                Some(secs) => generator.generate_token_valid_for(Duration::from_secs(*secs), bound)?,
                None => generator.generate_token(Expiry::Never, bound)?,
            };
            writeln!(out, "{token}")?;
            Ok(true)
        }
        TokenCommand::Check {
            generator,
            token,
            bound_value,
            now,
        } => {
            let generator = build_generator(generator)?;
            let bound = bound_value.as_deref().map(str::as_bytes);
            let valid = generator.check_token_at(token, bound, now.unwrap_or_else(now_unix));
            writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
            Ok(valid)
        }
        TokenCommand::Inspect {
            generator,
            token,
            bound_value,
        } => {
            let generator = build_generator(generator)?;
            let bound = bound_value.as_deref().map(str::as_bytes);
            match generator.expiry_time(token, bound) {
                Ok(expires) => {
                    writeln!(out, "expires: {}", describe_expiry(expires))?;
                    let expired = expires.is_expired_at(now_unix());
                    writeln!(out, "status: {}", if expired { "expired" } else { "valid" })?;
                    Ok(!expired)
                }
                Err(e @ (TokenError::BadToken(_) | TokenError::InvalidToken)) => {
                    writeln!(out, "status: rejected ({e})")?;
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

pub fn run_password(
    cmd: &PasswordCommand,
    password: &str,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    match cmd {
        PasswordCommand::Hash { algorithm } => {
            let hash = context_for(*algorithm).hash(password)?;
            writeln!(out, "{hash}")?;
            Ok(true)
        }
        PasswordCommand::Verify { hash } => {
            // Verification accepts every supported algorithm.
            let matched = PasswordContext::default().verify(password, hash)?;
            writeln!(out, "{}", if matched { "match" } else { "mismatch" })?;
            Ok(matched)
        }
    }
}

fn context_for(algorithm: Algorithm) -> PasswordContext {
    match algorithm {
        Algorithm::Argon2id => PasswordContext::default(),
        Algorithm::Pbkdf2Sha256 => PasswordContext::Pbkdf2Sha256 {
            rounds: PBKDF2_ROUNDS,
        },
        Algorithm::Pbkdf2Sha512 => PasswordContext::Pbkdf2Sha512 {
            rounds: PBKDF2_ROUNDS,
        },
    }
}

fn describe_expiry(expires: Expiry) -> String {
    match expires {
        Expiry::Never => "never".into(),
        Expiry::At(ts) => {
            let when = i64::try_from(ts)
                .ok()
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| "out of range".into());
            format!("{ts} ({when})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GeneratorArgs {
        GeneratorArgs {
            secret_key: "cli-secret".into(),
            config: None,
            url_safe: false,
        }
    }

    fn run(cmd: TokenCommand) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run_token(&cmd, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    fn generate(bound: Option<&str>, valid_for: Option<u64>) -> String {
        let (ok, out) = run(TokenCommand::Generate {
            generator: args(),
            valid_for,
            bound_value: bound.map(String::from),
        });
        assert!(ok);
        out.trim().to_string()
    }

    #[test]
    fn generate_then_check() {
        let token = generate(Some("pwhash"), None);

        let (ok, out) = run(TokenCommand::Check {
            generator: args(),
            token: token.clone(),
            bound_value: Some("pwhash".into()),
            now: None,
        });
        assert!(ok);
        assert_eq!(out, "valid\n");

        let (ok, out) = run(TokenCommand::Check {
            generator: args(),
            token,
            bound_value: Some("other".into()),
            now: None,
        });
        assert!(!ok);
        assert_eq!(out, "invalid\n");
    }

    #[test]
    fn check_with_explicit_time() {
        let token = generate(None, Some(60));
        let (ok, _) = run(TokenCommand::Check {
            generator: args(),
            token,
            bound_value: None,
            now: Some(now_unix() + 120),
        });
        assert!(!ok);
    }

    #[test]
    fn inspect_reports_expiry() {
        let token = generate(None, None);
        let (ok, out) = run(TokenCommand::Inspect {
            generator: args(),
            token,
            bound_value: None,
        });
        assert!(ok);
        assert!(out.contains("expires: never"));
        assert!(out.contains("status: valid"));
    }

    #[test]
    fn inspect_reports_rejection() {
        let (ok, out) = run(TokenCommand::Inspect {
            generator: args(),
            token: "garbage".into(),
            bound_value: None,
        });
        assert!(!ok);
        assert!(out.starts_with("status: rejected"));
    }

    #[test]
    fn url_safe_flag_overrides_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");
        std::fs::write(&path, r#"{"encoding": "hex"}"#).unwrap();

        let generator = build_generator(&GeneratorArgs {
            secret_key: "k".into(),
            config: Some(path),
            url_safe: true,
        })
        .unwrap();
        assert_eq!(generator.encoding(), TokenEncoding::UrlSafe);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = build_generator(&GeneratorArgs {
            secret_key: "k".into(),
            config: Some("/nonexistent/alcohol/tokens.json".into()),
            url_safe: false,
        });
        assert!(result.is_err());
    }

    #[test]
    fn password_hash_and_verify() {
        let mut out = Vec::new();
        let cmd = PasswordCommand::Hash {
            algorithm: Algorithm::Argon2id,
        };
        assert!(run_password(&cmd, "hunter2", &mut out).unwrap());
        let hash = String::from_utf8(out).unwrap().trim().to_string();
        assert!(hash.starts_with("$argon2id$"));

        let verify = PasswordCommand::Verify { hash };
        let mut out = Vec::new();
        assert!(run_password(&verify, "hunter2", &mut out).unwrap());
        assert_eq!(out, b"match\n");

        let mut out = Vec::new();
        assert!(!run_password(&verify, "hunter3", &mut out).unwrap());
        assert_eq!(out, b"mismatch\n");
    }

    #[test]
    fn expiry_description() {
        assert_eq!(describe_expiry(Expiry::Never), "never");
        assert_eq!(
            describe_expiry(Expiry::At(0)),
            "0 (1970-01-01T00:00:00+00:00)"
        );
    }
}
