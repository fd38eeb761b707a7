//! Raw request command implementation.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;

use duet_http::{ApiClient, ApiRequest, Method};

use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    pub method: String,

    /// Path relative to the API base URL, e.g. /diaries
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,
}

fn parse_query_pair(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        bail!("empty query key in '{}'", s);
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(args: RequestArgs, client: &ApiClient) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;

    let mut request = ApiRequest::new(method, args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    if let Some(data) = args.data {
        let body: serde_json::Value =
            serde_json::from_str(&data).context("--data is not valid JSON")?;
        request = request.body(body);
    }

    let response = client.request(request).await.context("Request failed")?;
    let status = response.status();
    output::note(&format!("HTTP {}", status));

    let text = response.text().await.context("Failed to read response body")?;
    if !text.is_empty() {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => output::json_pretty(&json)?,
            Err(_) => {
                output::warning("Response body is not JSON");
                println!("{}", text);
            }
        }
    }

    if !status.is_success() {
        bail!("Server responded with HTTP {}", status);
    }

    Ok(())
}
