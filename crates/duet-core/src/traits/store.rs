//! Session store trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::User;
use crate::{Result, Session};

/// Durable storage for the session and the cached user profile.
///
/// The API client is the only writer of session data. Implementations must
/// replace both tokens together in [`SessionStore::set`]; a reader never
/// observes a new access token paired with an old refresh token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, if any.
    async fn get(&self) -> Result<Option<Session>>;

    /// Persist a session, replacing any previous one.
    async fn set(&self, session: &Session) -> Result<()>;

    /// Delete the session and the cached profile.
    async fn clear(&self) -> Result<()>;

    /// Returns the cached user profile, if any.
    async fn get_profile(&self) -> Result<Option<User>>;

    /// Cache the user profile. Does nothing when no session is stored, so a
    /// profile fetched before a logout is never written back after it.
    async fn set_profile(&self, user: &User) -> Result<()>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self) -> Result<Option<Session>> {
        (**self).get().await
    }

    async fn set(&self, session: &Session) -> Result<()> {
        (**self).set(session).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }

    async fn get_profile(&self) -> Result<Option<User>> {
        (**self).get_profile().await
    }

    async fn set_profile(&self, user: &User) -> Result<()> {
        (**self).set_profile(user).await
    }
}
