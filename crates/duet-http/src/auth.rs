//! Login, registration and logout.

use reqwest::StatusCode;
use tracing::{debug, info, instrument};

use duet_core::error::AuthError;
use duet_core::{Credentials, Registration, Result, Session, User};

use crate::client::{ApiClient, parse_error_response, parse_json};
use crate::endpoints::{LOGIN, LoginRequest, REGISTER, RegisterRequest, TokenResponse};
use crate::request::ApiRequest;

impl ApiClient {
    /// Log in and store the returned session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the backend rejects the
    /// username or password.
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session> {
        info!("Logging in");

        let request = ApiRequest::post(LOGIN).anonymous().json(&LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
        })?;

        let response = self.request(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let error = parse_error_response(response).await;
            let detail = error
                .detail
                .unwrap_or_else(|| "username or password rejected".to_string());
            return Err(AuthError::InvalidCredentials(detail).into());
        }

        let tokens: TokenResponse = parse_json(response).await?;
        let session = tokens.into_session();
        self.install_session(session.clone()).await?;

        debug!("Session created successfully");
        Ok(session)
    }

    /// Create an account. Does not log in.
    #[instrument(skip(self, registration), fields(username = %registration.username()))]
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        info!("Registering account");

        let request = ApiRequest::post(REGISTER).anonymous().json(&RegisterRequest {
            username: registration.username(),
            email: registration.email(),
            nickname: registration.nickname(),
            password: registration.password(),
        })?;

        let response = self.request(request).await?;
        let user: User = parse_json(response).await?;

        debug!(user_id = user.id, "Account created");
        Ok(user)
    }

    /// Forget the session. The backend keeps no server-side session, so
    /// this only touches local storage.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.clear_session().await
    }
}
