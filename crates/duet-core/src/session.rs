//! The access/refresh token pair.

use std::fmt;

use crate::{AccessToken, RefreshToken};

/// An authenticated session: the access/refresh token pair.
///
/// Sessions are created on login, replaced as a whole on refresh and
/// dropped on logout or failed refresh. Neither token is ever updated on
/// its own.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: AccessToken,
    refresh_token: RefreshToken,
}

impl Session {
    /// Create a session from a token pair.
    pub fn new(access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    /// Returns the access token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the refresh token.
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
