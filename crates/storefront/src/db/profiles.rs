//! Profile repository (users collection).

use layercraft_core::{ProfileId, UserId};
use tracing::instrument;

use super::{Collection, RepositoryError};
use crate::appwrite::{AppwriteClient, Document, DocumentList, Query};
use crate::config::AppwriteConfig;
use crate::models::{NewProfile, UserProfile};

/// Repository for profile documents.
pub struct ProfileRepository<'a> {
    collection: Collection<'a>,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig) -> Self {
        Self {
            collection: Collection::new(client, config, &config.collections.users),
        }
    }

    /// Store a profile under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the backend rejects the document.
    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn create(&self, profile: &NewProfile) -> Result<UserProfile, RepositoryError> {
        let c = self.collection;
        let id = ProfileId::unique();
        let doc: Document<NewProfile> = c
            .client
            .create_document(c.database_id, c.collection_id, id.as_str(), profile)
            .await?;
        Ok(doc.into())
    }

    /// Get the profile belonging to an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the lookup fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let c = self.collection;
        let page: DocumentList<NewProfile> = c
            .client
            .list_documents(
                c.database_id,
                c.collection_id,
                &[Query::equal("userId", user_id.as_str()), Query::limit(1)],
            )
            .await?;
        Ok(page.documents.into_iter().next().map(UserProfile::from))
    }
}
