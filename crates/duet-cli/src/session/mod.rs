//! Client construction from command-line options.

pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use duet_core::ApiUrl;
use duet_file::FileSessionStore;
use duet_http::{ApiClient, ClientConfig};

use crate::cli::ConnectionArgs;

/// Build an API client backed by the session file.
pub fn connect(args: &ConnectionArgs) -> Result<ApiClient> {
    let api_url = ApiUrl::new(&args.api_url).context("Invalid API URL")?;
    let path = storage::session_path(args.store.as_deref())?;
    debug!(api = %api_url, store = %path.display(), "Connecting");

    let config = ClientConfig::new(api_url)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_user_agent(concat!("duet-cli/", env!("DUET_VERSION")));

    let store = Arc::new(FileSessionStore::new(path));
    ApiClient::new(config, store).context("Failed to build HTTP client")
}
