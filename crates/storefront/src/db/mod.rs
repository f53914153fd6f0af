//! Repositories over the backend's document collections.
//!
//! # Collections
//!
//! - `users` - Profile documents (`userId`, `name`, `email`, `role`, `avatar`)
//! - `products` - Catalog
//! - `orders` - Placed orders; line items are JSON-encoded strings
//! - `requests` - Custom order requests
//!
//! Collection IDs come from configuration. Each repository borrows the
//! shared [`AppwriteClient`] and converts wire records into domain models.

pub mod orders;
pub mod products;
pub mod profiles;
pub mod requests;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;
pub use requests::RequestRepository;

use thiserror::Error;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::AppwriteConfig;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(AppwriteError),

    /// Stored data could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Document ID or unique attribute already taken.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<AppwriteError> for RepositoryError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::NotFound(_) => Self::NotFound,
            AppwriteError::Conflict(message) => Self::Conflict(message),
            AppwriteError::Parse(e) => Self::DataCorruption(e.to_string()),
            other => Self::Backend(other),
        }
    }
}

/// A database and collection pair with the client used to reach it.
#[derive(Clone, Copy)]
struct Collection<'a> {
    client: &'a AppwriteClient,
    database_id: &'a str,
    collection_id: &'a str,
}

impl<'a> Collection<'a> {
    fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig, collection_id: &'a str) -> Self {
        Self {
            client,
            database_id: config.database_id.as_str(),
            collection_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_map_to_repository_errors() {
        assert!(matches!(
            RepositoryError::from(AppwriteError::NotFound("gone".to_string())),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from(AppwriteError::Conflict("taken".to_string())),
            RepositoryError::Conflict(ref m) if m == "taken"
        ));
        assert!(matches!(
            RepositoryError::from(AppwriteError::RateLimited(5)),
            RepositoryError::Backend(AppwriteError::RateLimited(5))
        ));
    }
}
