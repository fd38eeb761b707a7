//! Subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod register;
mod request;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use duet_http::ApiClient;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login(login::LoginArgs),

    /// Create a new account
    Register(register::RegisterArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Send an authenticated request and print the response
    Request(request::RequestArgs),
}

pub async fn handle(cmd: Command, client: &ApiClient) -> Result<()> {
    match cmd {
        Command::Login(args) => login::run(args, client).await,
        Command::Register(args) => register::run(args, client).await,
        Command::Logout(args) => logout::run(args, client).await,
        Command::Whoami(args) => whoami::run(args, client).await,
        Command::RefreshToken(args) => refresh_token::run(args, client).await,
        Command::Request(args) => request::run(args, client).await,
    }
}
