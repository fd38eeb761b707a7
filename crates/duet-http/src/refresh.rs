//! Single-flight coordination of session refreshes.
//!
//! Every change to the stored session (refresh, login, logout) runs while
//! holding one async mutex. A request rejected with 401 hands the coordinator
//! the access token that was rejected. Once it holds the lock it compares
//! that token with the one currently stored: if they differ, another caller
//! already replaced the session and the request reuses it instead of
//! spending the refresh token a second time. If they match, nobody has
//! refreshed on its behalf yet and the refresh runs.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use duet_core::error::AuthError;
use duet_core::{AccessToken, Result, Session};

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    lock: Mutex<()>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace the session rejected with `rejected`, unless that already
    /// happened.
    ///
    /// `load` reads the stored session and `refresh` exchanges the refresh
    /// token; both run under the lock. With `rejected` set, `refresh` runs
    /// only if the stored access token is still the rejected one, so callers
    /// rejected with the same token share one refresh. If the session was
    /// cleared meanwhile the result is [`AuthError::SessionCleared`].
    ///
    /// Without `rejected` (an explicit refresh) `refresh` always runs.
    pub(crate) async fn refresh<L, LFut, F, Fut>(
        &self,
        rejected: Option<&AccessToken>,
        load: L,
        refresh: F,
    ) -> Result<Session>
    where
        L: FnOnce() -> LFut,
        LFut: Future<Output = Result<Option<Session>>>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session>>,
    {
        let _guard = self.lock.lock().await;

        if let Some(rejected) = rejected {
            match load().await? {
                Some(current) if current.access_token() != rejected => {
                    debug!("Session replaced while waiting; reusing it");
                    return Ok(current);
                }
                Some(_) => {}
                None => return Err(AuthError::SessionCleared.into()),
            }
        }

        refresh().await
    }

    /// Run a session change (login, logout, profile caching) exclusively.
    pub(crate) async fn exclusive<F, Fut, T>(&self, update: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _guard = self.lock.lock().await;
        update().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use duet_core::error::{Error, ProtocolError};
    use duet_core::{MemorySessionStore, RefreshToken, SessionStore};

    fn session(access: &str) -> Session {
        Session::new(AccessToken::new(access), RefreshToken::new("r"))
    }

    async fn rejected() -> Result<Session> {
        Err(AuthError::refresh_failed(ProtocolError::new(401, None)).into())
    }

    async fn unused() -> Result<Session> {
        Ok(session("unused"))
    }

    #[tokio::test]
    async fn refresh_runs_when_stored_token_was_rejected() {
        let coordinator = RefreshCoordinator::new();
        let store = MemorySessionStore::with_session(session("a1"));

        let refreshed = coordinator
            .refresh(
                Some(&AccessToken::new("a1")),
                || store.get(),
                || async { Ok::<_, Error>(session("a2")) },
            )
            .await
            .unwrap();

        assert_eq!(refreshed.access_token().as_str(), "a2");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let coordinator = RefreshCoordinator::new();
        let store = MemorySessionStore::with_session(session("a1"));
        let calls = AtomicUsize::new(0);
        let (store, calls) = (&store, &calls);
        let a1 = AccessToken::new("a1");

        let attempt = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            let fresh = session("shared");
            store.set(&fresh).await.unwrap();
            Ok::<_, Error>(fresh)
        };

        let (first, second, third) = tokio::join!(
            coordinator.refresh(Some(&a1), || store.get(), attempt),
            coordinator.refresh(Some(&a1), || store.get(), attempt),
            coordinator.refresh(Some(&a1), || store.get(), attempt),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in [first, second, third] {
            assert_eq!(result.unwrap().access_token().as_str(), "shared");
        }
    }

    #[tokio::test]
    async fn replaced_session_is_reused() {
        let coordinator = RefreshCoordinator::new();
        let store = MemorySessionStore::with_session(session("from-login"));

        let result = coordinator
            .refresh(Some(&AccessToken::new("a1")), || store.get(), unused)
            .await
            .unwrap();

        assert_eq!(result.access_token().as_str(), "from-login");
    }

    #[tokio::test]
    async fn token_read_after_a_refresh_still_gets_its_own() {
        let coordinator = RefreshCoordinator::new();
        // The caller read "a2" after someone else refreshed, and "a2" was
        // rejected too. Reusing the stored "a2" would retry a dead token.
        let store = MemorySessionStore::with_session(session("a2"));

        let result = coordinator
            .refresh(
                Some(&AccessToken::new("a2")),
                || store.get(),
                || async { Ok::<_, Error>(session("a3")) },
            )
            .await
            .unwrap();

        assert_eq!(result.access_token().as_str(), "a3");
    }

    #[tokio::test]
    async fn waiters_see_failed_refresh_as_cleared() {
        let coordinator = RefreshCoordinator::new();
        let store = MemorySessionStore::with_session(session("a1"));
        let a1 = AccessToken::new("a1");
        let store = &store;

        let failing = move || async move {
            store.clear().await.unwrap();
            rejected().await
        };

        let (first, second) = tokio::join!(
            coordinator.refresh(Some(&a1), || store.get(), failing),
            coordinator.refresh(Some(&a1), || store.get(), unused),
        );

        assert!(matches!(
            first,
            Err(Error::Auth(AuthError::RefreshFailed { .. }))
        ));
        assert!(matches!(second, Err(Error::Auth(AuthError::SessionCleared))));
    }

    #[tokio::test]
    async fn explicit_refresh_always_runs() {
        let coordinator = RefreshCoordinator::new();
        let store = MemorySessionStore::with_session(session("a1"));

        let result = coordinator
            .refresh(None, || store.get(), || async { Ok::<_, Error>(session("a2")) })
            .await
            .unwrap();

        assert_eq!(result.access_token().as_str(), "a2");
    }

    #[tokio::test]
    async fn exclusive_returns_update_result() {
        let coordinator = RefreshCoordinator::new();

        let value = coordinator
            .exclusive(|| async { Ok::<_, Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let failed = coordinator
            .exclusive(|| async { Err::<(), _>(Error::from(AuthError::NotAuthenticated)) })
            .await;
        assert!(failed.is_err());
    }
}
