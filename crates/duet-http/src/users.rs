//! Profile of the logged-in user.

use tracing::{debug, instrument};

use duet_core::{ProfileUpdate, Result, User};

use crate::client::ApiClient;
use crate::endpoints::CURRENT_USER;

impl ApiClient {
    /// Fetch the logged-in user's profile and cache it in the session store.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let user: User = self.get_json(CURRENT_USER).await?;
        self.cache_profile(&user).await?;
        debug!(user_id = user.id, "Fetched current user");
        Ok(user)
    }

    /// Update the logged-in user's profile and cache the result.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        update.validate()?;

        let user: User = self.put_json(CURRENT_USER, update).await?;
        self.cache_profile(&user).await?;
        debug!(user_id = user.id, "Updated profile");
        Ok(user)
    }

    /// Returns the profile cached by the last successful fetch or update.
    pub async fn cached_user(&self) -> Result<Option<User>> {
        self.store().get_profile().await
    }
}
