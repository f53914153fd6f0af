//! Unified error handling with Sentry integration.
//!
//! Every fallible storefront operation surfaces as an [`AppError`]. Callers
//! log and re-throw; the embedding UI shows [`AppError::user_message`], which
//! never leaks backend details.

use thiserror::Error;

use crate::appwrite::AppwriteError;
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend document operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Backend request outside the repositories failed.
    #[error("Backend error: {0}")]
    Backend(#[from] AppwriteError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before reaching the backend.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error points at the backend or our own code rather than
    /// at the user's input.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err) => !matches!(
                err,
                RepositoryError::NotFound
                    | RepositoryError::Conflict(_)
                    | RepositoryError::Backend(AppwriteError::RateLimited(_))
            ),
            Self::Backend(err) => !matches!(
                err,
                AppwriteError::NotFound(_)
                    | AppwriteError::Unauthorized(_)
                    | AppwriteError::RateLimited(_)
            ),
            Self::Auth(err) => matches!(err, AuthError::Backend(_) | AuthError::Repository(_)),
            Self::Config(_) | Self::Internal(_) => true,
            Self::Validation(_) | Self::NotFound(_) | Self::Unauthorized(_) | Self::Forbidden(_) => {
                false
            }
        }
    }

    /// Log the error, capturing server-side errors to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront request rejected");
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(_)) => {
                "That item already exists".to_string()
            }
            Self::Database(RepositoryError::Backend(AppwriteError::RateLimited(secs)))
            | Self::Backend(AppwriteError::RateLimited(secs)) => {
                format!("Too many requests, please try again in {secs} seconds")
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::NotLoggedIn => "Please log in to continue".to_string(),
                AuthError::Backend(_) | AuthError::Repository(_) => {
                    "Authentication error, please try again".to_string()
                }
            },
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(_) | Self::Backend(AppwriteError::Unauthorized(_)) => {
                "Please log in to continue".to_string()
            }
            Self::Forbidden(_) => "You do not have permission to do that".to_string(),
            Self::Database(_) | Self::Backend(_) | Self::Config(_) | Self::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Map a repository `NotFound` to `AppError::NotFound(what)`.
pub(crate) fn not_found_as(what: impl Into<String>) -> impl FnOnce(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(what.into()),
        other => AppError::Database(other),
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "65a1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product p1".to_string());
        assert_eq!(err.to_string(), "Not found: product p1");

        let err = AppError::Validation("Your cart is empty".to_string());
        assert_eq!(err.to_string(), "Validation error: Your cart is empty");
    }

    #[test]
    fn test_user_message_hides_backend_details() {
        let err = AppError::Database(RepositoryError::Backend(AppwriteError::Api {
            status: 500,
            kind: "general_unknown".to_string(),
            message: "stack trace here".to_string(),
        }));
        assert_eq!(err.user_message(), "Something went wrong, please try again");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_user_message_for_auth_errors() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).user_message(),
            "Invalid credentials"
        );
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).user_message(),
            "An account with this email already exists"
        );
        assert_eq!(
            AppError::Auth(AuthError::WeakPassword("too short".to_string())).user_message(),
            "too short"
        );
        assert!(!AppError::Auth(AuthError::InvalidCredentials).is_server_error());
    }

    #[test]
    fn test_user_message_for_rate_limit() {
        let err = AppError::Database(RepositoryError::Backend(AppwriteError::RateLimited(30)));
        assert_eq!(
            err.user_message(),
            "Too many requests, please try again in 30 seconds"
        );
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_client_errors_are_not_reported_as_server_errors() {
        assert!(!AppError::Forbidden("dashboard".to_string()).is_server_error());
        assert!(!AppError::Validation("empty".to_string()).is_server_error());
        assert!(!AppError::Database(RepositoryError::NotFound).is_server_error());
        assert_eq!(
            AppError::NotFound("Order o1".to_string()).user_message(),
            "Order o1 not found"
        );
    }

    #[test]
    fn test_not_found_as() {
        let err = not_found_as("Product p1")(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(ref what) if what == "Product p1"));

        let err = not_found_as("Product p1")(RepositoryError::Conflict("x".to_string()));
        assert!(matches!(err, AppError::Database(RepositoryError::Conflict(_))));
    }
}
