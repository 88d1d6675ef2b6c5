//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "alcohol")]
#[command(about = "Issue and check signed tokens and password hashes", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Signed, expiring tokens.
    #[command(subcommand)]
    Token(TokenCommand),

    /// Password hashes. The password is read from stdin.
    #[command(subcommand)]
    Password(PasswordCommand),
}

/// Settings shared by all token subcommands.
#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Server secret key.
    #[arg(long, env = "ALCOHOL_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// JSON file with scheme and encoding settings.
    #[arg(long, env = "ALCOHOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use URL-safe base64 instead of hex, overriding the config file.
    #[arg(long)]
    pub url_safe: bool,
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Issue a token.
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Lifetime in seconds. Without it the token never expires.
        #[arg(long)]
        valid_for: Option<u64>,

        /// Value the token is bound to.
        #[arg(long)]
        bound_value: Option<String>,
    },

    /// Check a token. Exits non-zero if it is not valid.
    Check {
        #[command(flatten)]
        generator: GeneratorArgs,

        token: String,

        #[arg(long)]
        bound_value: Option<String>,

        /// Unix time to check against instead of the current time.
        #[arg(long)]
        now: Option<i64>,
    },

    /// Verify a token's checksum and print its expiry.
    Inspect {
        #[command(flatten)]
        generator: GeneratorArgs,

        token: String,

        #[arg(long)]
        bound_value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PasswordCommand {
    /// Hash a password.
    Hash {
        #[arg(long, value_enum, default_value_t = Algorithm::Argon2id)]
        algorithm: Algorithm,
    },

    /// Check a password against a hash. Exits non-zero on mismatch.
    Verify {
        #[arg(long)]
        hash: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Argon2id,
    Pbkdf2Sha256,
    Pbkdf2Sha512,
}
