//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use duet_core::User;
use duet_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Show the cached profile without contacting the API
    #[arg(long)]
    pub offline: bool,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, client: &ApiClient) -> Result<()> {
    if client.session().await?.is_none() {
        bail!("No active session. Run 'duet login' first.");
    }

    let user = if args.offline {
        client
            .cached_user()
            .await?
            .context("No cached profile. Run 'duet whoami' while online first.")?
    } else {
        client
            .current_user()
            .await
            .context("Failed to fetch profile")?
    };

    if args.json {
        return output::json_pretty(&user);
    }

    print_user(&user);
    Ok(())
}

fn print_user(user: &User) {
    output::field("ID", &user.id.to_string());
    output::field("Username", &user.username);
    output::field("Nickname", &user.nickname);
    output::field("Email", &user.email);
    if let Some(ref bio) = user.bio {
        output::field("Bio", bio);
    }
    if let Some(ref avatar) = user.avatar_url {
        output::field("Avatar", avatar);
    }
}
