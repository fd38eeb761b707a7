//! Refresh token command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use duet_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, client: &ApiClient) -> Result<()> {
    if client.session().await?.is_none() {
        bail!("No active session. Run 'duet login' first.");
    }

    output::note("Refreshing session...");

    client
        .refresh()
        .await
        .context("Failed to refresh session; log in again")?;

    output::success("Session refreshed successfully");
    Ok(())
}
