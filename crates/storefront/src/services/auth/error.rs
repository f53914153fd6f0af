//! Authentication error types.

use thiserror::Error;

use crate::appwrite::AppwriteError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] layercraft_core::EmailError),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No profile document for the account.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No active session.
    #[error("not logged in")]
    NotLoggedIn,

    /// Account service request failed.
    #[error("backend error: {0}")]
    Backend(#[from] AppwriteError),

    /// Profile lookup or creation failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
