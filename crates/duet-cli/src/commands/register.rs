//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use duet_core::Registration;
use duet_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Username (3 to 50 characters)
    #[arg(long)]
    pub username: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Display name (1 to 50 characters)
    #[arg(long)]
    pub nickname: String,

    /// Password (6 to 100 characters)
    #[arg(long, env = "DUET_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Log in as the new account afterwards
    #[arg(long)]
    pub login: bool,
}

pub async fn run(args: RegisterArgs, client: &ApiClient) -> Result<()> {
    let registration = Registration::new(args.username, args.email, args.nickname, args.password)
        .context("Invalid registration")?;

    output::note("Creating account...");

    let user = client
        .register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::field("ID", &user.id.to_string());
    output::field("Username", &user.username);
    output::field("Nickname", &user.nickname);

    if args.login {
        client
            .login(registration.credentials())
            .await
            .context("Account created but login failed")?;
        output::success("Logged in");
    }

    Ok(())
}
