//! Backend endpoint paths and wire types.

use serde::{Deserialize, Serialize};

use duet_core::{AccessToken, RefreshToken, Session};

/// Endpoint for logging in.
pub const LOGIN: &str = "/auth/login";

/// Endpoint for creating an account.
pub const REGISTER: &str = "/auth/register";

/// Endpoint for exchanging a refresh token for a new token pair.
pub const REFRESH: &str = "/auth/refresh";

/// Endpoint for the authenticated user's profile.
pub const CURRENT_USER: &str = "/users/me";

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Request body for register.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub nickname: &'a str,
    pub password: &'a str,
}

/// Token pair returned by login and refresh.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    pub fn into_session(self) -> Session {
        Session::new(
            AccessToken::new(self.access_token),
            RefreshToken::new(self.refresh_token),
        )
    }
}

/// Error body. `detail` is a string for most errors and a list of
/// field errors for validation failures.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn detail_text(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
