//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Command-line client for the duet couple-space API.
#[derive(Parser, Debug)]
#[command(name = "duet")]
#[command(author, version = env!("DUET_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to reach the backend and where to keep the session.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// API base URL
    #[arg(long, env = "DUET_API_URL", global = true, default_value = duet_http::DEFAULT_API_URL)]
    pub api_url: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "DUET_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "DUET_TIMEOUT", global = true, default_value_t = 10)]
    pub timeout: u64,
}
