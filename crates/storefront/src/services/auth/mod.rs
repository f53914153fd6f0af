//! Authentication service.
//!
//! Accounts and sessions live in the backend's account service; the session
//! is the cookie held by the shared client. Each account also has a profile
//! document in the users collection carrying its role and avatar.

mod error;

pub use error::AuthError;

use layercraft_core::{Email, UserId, UserRole};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use crate::appwrite::{Account, AppwriteClient, AppwriteError};
use crate::config::StorefrontConfig;
use crate::db::{ProfileRepository, RepositoryError};
use crate::models::{NewProfile, User, UserProfile};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles sign-up, login, logout and resolving the current user.
pub struct AuthService<'a> {
    client: &'a AppwriteClient,
    profiles: ProfileRepository<'a>,
    config: &'a StorefrontConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a StorefrontConfig) -> Self {
        Self {
            client,
            profiles: ProfileRepository::new(client, &config.appwrite),
            config,
        }
    }

    /// Register a new account, log in, and create its profile.
    ///
    /// A blank name falls back to the local part of the email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let name = match name.trim() {
            "" => email.as_str().split('@').next().unwrap_or_default().to_string(),
            trimmed => trimmed.to_string(),
        };
        let password = SecretString::from(password.to_owned());

        let account = self
            .client
            .create_account(&UserId::unique(), &email, &password, &name)
            .await
            .map_err(|e| match e {
                AppwriteError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Backend(other),
            })?;

        self.client.create_email_session(&email, &password).await?;

        let avatar = self.client.initials_avatar_url(&name)?;
        let profile = self
            .profiles
            .create(&NewProfile {
                user_id: account.id.clone(),
                name: name.clone(),
                email: email.clone(),
                role: UserRole::User,
                avatar: avatar.into(),
            })
            .await?;

        info!(user_id = %account.id, "Account created");

        Ok(User {
            role: self.resolve_role(&email, Some(&profile)),
            id: account.id,
            email,
            name,
        })
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn log_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let password = SecretString::from(password.to_owned());

        self.client
            .create_email_session(&email, &password)
            .await
            .map_err(|e| match e {
                AppwriteError::Unauthorized(_) => AuthError::InvalidCredentials,
                other => AuthError::Backend(other),
            })?;

        let resolved = match self.client.get_account().await {
            Ok(account) => self.resolve_user(account).await,
            Err(e) => Err(e.into()),
        };

        match resolved {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "Logged in");
                Ok(user)
            }
            Err(e) => {
                // Do not leave a session behind that the caller never sees.
                if let Err(cleanup) = self.client.delete_session("current").await {
                    warn!(error = %cleanup, "Failed to end session after login error");
                }
                Err(e)
            }
        }
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotLoggedIn` if there is no active session.
    #[instrument(skip(self))]
    pub async fn log_out(&self) -> Result<(), AuthError> {
        self.client
            .delete_session("current")
            .await
            .map_err(|e| match e {
                AppwriteError::Unauthorized(_) => AuthError::NotLoggedIn,
                other => AuthError::Backend(other),
            })?;

        info!("Logged out");
        Ok(())
    }

    /// The user behind the current session, if any.
    ///
    /// Any failure, including a missing session, yields `None`.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Option<User> {
        let account = match self.client.get_account().await {
            Ok(account) => account,
            Err(e) => {
                debug!(error = %e, "No current account");
                return None;
            }
        };

        match self.resolve_user(account).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Failed to resolve current user");
                None
            }
        }
    }

    /// Get the profile document for an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account has no profile.
    pub async fn profile_by_user_id(&self, user_id: &UserId) -> Result<UserProfile, AuthError> {
        self.profiles
            .get_by_user_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn resolve_user(&self, account: Account) -> Result<User, AuthError> {
        let email = Email::parse(&account.email)?;

        let profile = match self.profile_by_user_id(&account.id).await {
            Ok(profile) => Some(profile),
            Err(AuthError::UserNotFound) => {
                warn!(user_id = %account.id, "Account has no profile, using default role");
                None
            }
            Err(AuthError::Repository(RepositoryError::Backend(AppwriteError::Http(e)))) => {
                return Err(AuthError::Backend(AppwriteError::Http(e)));
            }
            Err(e) => {
                warn!(user_id = %account.id, error = %e, "Profile unreadable, using default role");
                None
            }
        };

        let name = match (&profile, account.name.is_empty()) {
            (Some(profile), true) => profile.name.clone(),
            _ => account.name,
        };

        Ok(User {
            role: self.resolve_role(&email, profile.as_ref()),
            id: account.id,
            email,
            name,
        })
    }

    /// Profile role, promoted to admin for configured admin emails.
    fn resolve_role(&self, email: &Email, profile: Option<&UserProfile>) -> UserRole {
        if self.config.is_admin_email(email) {
            return UserRole::Admin;
        }
        profile.map_or(UserRole::User, |p| p.role)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("correct horse battery staple").is_ok());
    }

    #[test]
    fn test_weak_password_message() {
        let err = validate_password("abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "password validation failed: password must be at least 8 characters"
        );
    }
}
