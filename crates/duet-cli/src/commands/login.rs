//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use duet_core::Credentials;
use duet_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "DUET_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client: &ApiClient) -> Result<()> {
    let credentials = Credentials::new(&args.username, &args.password);

    output::note("Logging in...");

    client.login(credentials).await.context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Username", &args.username);
    output::field("API", &client.base_url().to_string());

    Ok(())
}
