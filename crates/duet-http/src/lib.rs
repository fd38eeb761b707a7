//! duet-http - Authenticated HTTP client for the duet backend.
//!
//! [`ApiClient`] attaches the stored access token to every request. When the
//! backend answers 401 it refreshes the session once, through a single-flight
//! coordinator shared by all concurrent requests, and re-issues the request
//! with the new token.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use duet_core::{ApiUrl, Credentials, MemorySessionStore};
//! use duet_http::{ApiClient, ApiRequest, ClientConfig};
//!
//! # async fn example() -> Result<(), duet_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("http://localhost:8000/api/v1")?);
//! let client = ApiClient::new(config, Arc::new(MemorySessionStore::new()))?;
//!
//! client.login(Credentials::new("alice", "hunter22")).await?;
//! let me = client.current_user().await?;
//! println!("Logged in as {}", me.nickname);
//!
//! let response = client.request(ApiRequest::get("/diaries")).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod endpoints;
mod refresh;
mod request;
mod users;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use request::ApiRequest;

pub use reqwest::{Method, Response, StatusCode};
