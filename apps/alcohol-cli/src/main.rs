//! alcohol command-line entry point.

mod cli;
mod commands;

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout only carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting alcohol");

    let mut stdout = io::stdout().lock();
    let ok = match &cli.command {
        Command::Token(cmd) => commands::run_token(cmd, &mut stdout)?,
        Command::Password(cmd) => {
            let password = read_password()?;
            commands::run_password(cmd, &password, &mut stdout)?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Reads one line from stdin, without the line terminator.
fn read_password() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        anyhow::bail!("no password given on stdin");
    }
    Ok(trimmed.to_string())
}
