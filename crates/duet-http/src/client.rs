//! Authenticated HTTP client.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace, warn};

use duet_core::error::{AuthError, Error, InvalidInputError, ProtocolError, TransportError};
use duet_core::{AccessToken, ApiUrl, RefreshToken, Result, Session, SessionStore, User};

use crate::config::ClientConfig;
use crate::endpoints::{ErrorResponse, REFRESH, TokenResponse};
use crate::refresh::RefreshCoordinator;
use crate::request::ApiRequest;

/// HTTP client that manages the bearer session on behalf of its callers.
///
/// The client is the only component that reads or writes session data in
/// its [`SessionStore`]. It is cheap to clone; clones share the store and
/// the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base: ApiUrl,
    store: Arc<dyn SessionStore>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client for the configured backend, persisting the session in
    /// `store`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built (for
    /// example, when no TLS backend is available).
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base: config.base_url,
                store,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    /// Returns the API base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.inner.base
    }

    pub(crate) fn store(&self) -> &dyn SessionStore {
        self.inner.store.as_ref()
    }

    /// Send a request, refreshing the session once if the backend rejects
    /// the access token.
    ///
    /// Any response other than 401 is returned unchanged, including other
    /// error statuses. On 401 the session is refreshed (or an in-flight
    /// refresh is awaited) and the request is sent once more.
    ///
    /// # Errors
    ///
    /// - transport failures, unchanged
    /// - [`AuthError::RefreshFailed`] if the refresh was rejected; the
    ///   session has been cleared
    /// - [`AuthError::SessionCleared`] if a concurrent refresh failed or a
    ///   logout happened while the request was in flight
    /// - [`AuthError::SessionExpired`] if the retried request is rejected too
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn request(&self, request: ApiRequest) -> Result<Response> {
        if request.anonymous {
            return self.send(&request, None).await;
        }

        let Some(session) = self.inner.store.get().await? else {
            debug!("No stored session; sending without credentials");
            return self.send(&request, None).await;
        };

        let response = self.send(&request, Some(session.access_token())).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!("Access token rejected; refreshing session");
        let refreshed = self
            .inner
            .refresh
            .refresh(
                Some(session.access_token()),
                || self.inner.store.get(),
                || self.exchange_refresh_token(),
            )
            .await?;

        let retried = self.send(&request, Some(refreshed.access_token())).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("Request rejected again after refresh");
            return Err(AuthError::SessionExpired.into());
        }

        Ok(retried)
    }

    /// Refresh the session now, replacing both tokens.
    ///
    /// Runs under the same lock as the 401 recovery in
    /// [`ApiClient::request`]; requests rejected with the old token reuse
    /// the pair this call stores.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        self.inner
            .refresh
            .refresh(
                None,
                || self.inner.store.get(),
                || self.exchange_refresh_token(),
            )
            .await
    }

    /// Persist a token pair obtained elsewhere.
    pub async fn set_session(
        &self,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Result<()> {
        self.install_session(Session::new(access_token, refresh_token))
            .await
    }

    /// Delete both tokens and the cached profile.
    #[instrument(skip(self))]
    pub async fn clear_session(&self) -> Result<()> {
        let store = self.store();
        self.inner.refresh.exclusive(|| store.clear()).await?;
        debug!("Session cleared");
        Ok(())
    }

    /// Returns the stored session, if any.
    pub async fn session(&self) -> Result<Option<Session>> {
        self.inner.store.get().await
    }

    pub(crate) async fn install_session(&self, session: Session) -> Result<()> {
        let store = self.store();
        self.inner.refresh.exclusive(|| store.set(&session)).await
    }

    /// Cache a freshly fetched profile, unless the session was cleared while
    /// it was being fetched.
    pub(crate) async fn cache_profile(&self, user: &User) -> Result<()> {
        let store = self.store();
        self.inner
            .refresh
            .exclusive(|| async move {
                if store.get().await?.is_none() {
                    debug!("Session cleared meanwhile; not caching profile");
                    return Ok(());
                }
                store.set_profile(user).await
            })
            .await
    }

    /// Exchange the stored refresh token for a new pair. Clears the session
    /// on any failure. Only called through the coordinator.
    async fn exchange_refresh_token(&self) -> Result<Session> {
        match self.try_exchange_refresh_token().await {
            Ok(session) => {
                debug!("Session refreshed successfully");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed; clearing session");
                let failure = AuthError::refresh_failed(err);
                match self.inner.store.clear().await {
                    Ok(()) => Err(failure.into()),
                    Err(clear_err) => {
                        warn!(error = %clear_err, "Failed to clear session after refresh failure");
                        Err(failure.with_cleanup_error(clear_err).into())
                    }
                }
            }
        }
    }

    async fn try_exchange_refresh_token(&self) -> Result<Session> {
        let current = self
            .inner
            .store
            .get()
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        let url = self.inner.base.endpoint(REFRESH)?;
        debug!(%url, "Exchanging refresh token");

        let response = self
            .inner
            .http
            .post(&url)
            .header(AUTHORIZATION, bearer_value(&current.refresh_token().bearer())?)
            .send()
            .await
            .map_err(transport_error)?;

        let tokens: TokenResponse = parse_json(response).await?;
        let session = tokens.into_session();
        self.inner.store.set(&session).await?;
        Ok(session)
    }

    /// Send one attempt of a request.
    async fn send(&self, request: &ApiRequest, token: Option<&AccessToken>) -> Result<Response> {
        let url = self.inner.base.endpoint(&request.path)?;

        let mut headers = request.headers.clone();
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, bearer_value(&token.bearer())?);
        } else if request.anonymous {
            headers.remove(AUTHORIZATION);
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        trace!(status = %response.status(), "Response received");
        Ok(response)
    }

    // ========================================================================
    // Typed helpers
    // ========================================================================

    /// `GET` a JSON resource.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let response = self.request(ApiRequest::get(path)).await?;
        parse_json(response).await
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.request(ApiRequest::post(path).json(body)?).await?;
        parse_json(response).await
    }

    /// `PUT` a JSON body and decode the JSON response.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.request(ApiRequest::put(path).json(body)?).await?;
        parse_json(response).await
    }

    /// `DELETE` a resource, expecting no content back.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(ApiRequest::delete(path)).await?;
        check_status(response).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .finish_non_exhaustive()
    }
}

fn bearer_value(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| InvalidInputError::Other {
        message: "token contains characters not allowed in a header".to_string(),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let transport = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(transport)
}

/// Pass successful responses through; turn error statuses into
/// [`ProtocolError`].
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(Error::Protocol(parse_error_response(response).await))
    }
}

/// Decode a successful JSON response.
pub(crate) async fn parse_json<R: DeserializeOwned>(response: Response) -> Result<R> {
    let response = check_status(response).await?;
    response.json::<R>().await.map_err(transport_error)
}

/// Parse the backend's error body.
pub(crate) async fn parse_error_response(response: Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ErrorResponse>().await {
        Ok(body) => ProtocolError::new(status, body.detail_text()),
        Err(_) => ProtocolError::new(status, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::MemorySessionStore;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("https://api.example.com/api/v1").unwrap();
        let client =
            ApiClient::new(ClientConfig::new(api.clone()), Arc::new(MemorySessionStore::new()))
                .unwrap();
        assert_eq!(client.base_url(), &api);
        assert!(format!("{:?}", client).contains("api.example.com"));
    }

    #[test]
    fn bearer_value_is_sensitive() {
        let value = bearer_value("Bearer abc").unwrap();
        assert!(value.is_sensitive());
        assert!(bearer_value("Bearer a\nb").is_err());
    }
}
