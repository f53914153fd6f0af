//! Account service: sign-up, sessions and the current account.

use layercraft_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::types::{Account, Session};
use super::{AppwriteClient, AppwriteError};

impl AppwriteClient {
    /// Create a new account.
    ///
    /// Does not log in; call [`AppwriteClient::create_email_session`] next.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Conflict` if the email or ID is taken.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_account(
        &self,
        user_id: &UserId,
        email: &Email,
        password: &SecretString,
        name: &str,
    ) -> Result<Account, AppwriteError> {
        let url = self.url(&["account"])?;
        let body = json!({
            "userId": user_id,
            "email": email,
            "password": password.expose_secret(),
            "name": name,
        });

        self.send(self.http().post(url).json(&body)).await
    }

    /// Log in with email and password.
    ///
    /// The session cookie is stored in the client and sent with later calls.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Unauthorized` for wrong credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_email_session(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AppwriteError> {
        let url = self.url(&["account", "sessions", "email"])?;
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        self.send(self.http().post(url).json(&body)).await
    }

    /// Delete a session; pass `"current"` to log out.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Unauthorized` if there is no active session.
    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppwriteError> {
        let url = self.url(&["account", "sessions", session_id])?;
        self.send_empty(self.http().delete(url)).await
    }

    /// Get the account behind the current session.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Unauthorized` when logged out.
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> Result<Account, AppwriteError> {
        let url = self.url(&["account"])?;
        self.send(self.http().get(url)).await
    }

    /// URL of an initials avatar for `name`.
    ///
    /// Built locally; the image is rendered by the backend when fetched.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::InvalidUrl` if the endpoint cannot carry a path.
    pub fn initials_avatar_url(&self, name: &str) -> Result<Url, AppwriteError> {
        let mut url = self.url(&["avatars", "initials"])?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("project", self.project_id());
        Ok(url)
    }
}
