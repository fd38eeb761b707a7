//! User profile types.

use serde::{Deserialize, Serialize};

use crate::credentials::check_length;
use crate::error::Error;

/// A user profile as returned by `/auth/register` and `/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Creation timestamp exactly as the backend formats it.
    pub created_at: String,
}

/// Partial profile update for `PUT /users/me`.
///
/// Fields left as `None` are omitted from the request and keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Returns true if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }

    /// Check the nickname against the same bounds as registration.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(ref nickname) = self.nickname {
            check_length("nickname", nickname, 1, 50)?;
        }
        Ok(())
    }
}
