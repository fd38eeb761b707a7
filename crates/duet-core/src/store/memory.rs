//! In-memory session store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::SessionStore;
use crate::types::User;
use crate::{Result, Session};

/// A session store that lives only as long as the process.
///
/// Useful for tests and for callers that keep their own persistence.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    session: Option<Session>,
    profile: Option<User>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a session.
    pub fn with_session(session: Session) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                session: Some(session),
                profile: None,
            }),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        Ok(self.state.read().await.session.clone())
    }

    async fn set(&self, session: &Session) -> Result<()> {
        self.state.write().await.session = Some(session.clone());
        debug!("Stored session in memory");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.session = None;
        state.profile = None;
        debug!("Cleared in-memory session");
        Ok(())
    }

    async fn get_profile(&self) -> Result<Option<User>> {
        Ok(self.state.read().await.profile.clone())
    }

    async fn set_profile(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.session.is_some() {
            state.profile = Some(user.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessToken, RefreshToken};

    fn session(access: &str, refresh: &str) -> Session {
        Session::new(AccessToken::new(access), RefreshToken::new(refresh))
    }

    fn user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            nickname: "Al".to_string(),
            avatar_url: None,
            bio: None,
            created_at: "2024-02-14T08:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn set_then_get_returns_session() {
        let store = MemorySessionStore::new();
        assert!(store.get().await.unwrap().is_none());

        store.set(&session("a1", "r1")).await.unwrap();
        let stored = store.get().await.unwrap().unwrap();
        assert_eq!(stored.access_token().as_str(), "a1");
        assert_eq!(stored.refresh_token().as_str(), "r1");
    }

    #[tokio::test]
    async fn set_replaces_both_tokens() {
        let store = MemorySessionStore::with_session(session("a1", "r1"));
        store.set(&session("a2", "r2")).await.unwrap();

        let stored = store.get().await.unwrap().unwrap();
        assert_eq!(stored, session("a2", "r2"));
    }

    #[tokio::test]
    async fn clear_removes_tokens_and_profile() {
        let store = MemorySessionStore::with_session(session("a1", "r1"));
        store.set_profile(&user()).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.get().await.unwrap().is_none());
        assert!(store.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_is_not_cached_without_session() {
        let store = MemorySessionStore::new();
        store.set_profile(&user()).await.unwrap();
        assert!(store.get_profile().await.unwrap().is_none());
    }
}
