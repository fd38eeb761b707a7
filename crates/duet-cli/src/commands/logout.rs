//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use duet_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, client: &ApiClient) -> Result<()> {
    client.logout().await.context("Failed to clear session")?;
    output::success("Logged out");
    Ok(())
}
