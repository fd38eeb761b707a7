//! duet - CLI tool for exploring the duet backend.
//!
//! This is a thin wrapper over `duet-http`, intended for manual exploration
//! and debugging of the API. The session is kept in a file store between
//! invocations, so a login survives until logout or a failed refresh.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let client = session::connect(&cli.connection)?;
    commands::handle(cli.command, &client).await
}

/// Verbosity only raises the level of the duet crates; dependencies such as
/// hyper stay at `warn` unless `RUST_LOG` says otherwise.
fn init_logging(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let directives =
        format!("warn,duet={level},duet_core={level},duet_file={level},duet_http={level}");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let stderr = fmt::layer().with_writer(std::io::stderr);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr.with_target(false))
            .init();
    }
}
