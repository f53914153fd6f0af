//! Custom request repository.

use chrono::Utc;
use layercraft_core::{CustomRequestId, RequestStatus, UserId};
use serde::Serialize;
use tracing::instrument;

use super::{Collection, RepositoryError};
use crate::appwrite::{AppwriteClient, Document, Query};
use crate::config::AppwriteConfig;
use crate::models::request::CustomRequestRecord;
use crate::models::{CustomRequest, NewCustomRequest};

#[derive(Serialize)]
struct StatusUpdate {
    status: RequestStatus,
}

/// Repository for the requests collection.
pub struct RequestRepository<'a> {
    collection: Collection<'a>,
}

impl<'a> RequestRepository<'a> {
    /// Create a new request repository.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig) -> Self {
        Self {
            collection: Collection::new(client, config, &config.collections.requests),
        }
    }

    /// Store a submitted request as pending, dated now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the backend rejects the document.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create(&self, request: NewCustomRequest) -> Result<CustomRequest, RepositoryError> {
        let c = self.collection;
        let id = CustomRequestId::unique();
        let record = CustomRequestRecord::submitted(request, Utc::now());
        let doc: Document<CustomRequestRecord> = c
            .client
            .create_document(c.database_id, c.collection_id, id.as_str(), &record)
            .await?;
        Ok(doc.into())
    }

    /// Requests submitted by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if a page fails to load.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CustomRequest>, RepositoryError> {
        self.list(vec![
            Query::equal("userId", user_id.as_str()),
            Query::order_desc("$createdAt"),
        ])
        .await
    }

    /// Every request, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if a page fails to load.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<CustomRequest>, RepositoryError> {
        self.list(vec![Query::order_desc("$createdAt")]).await
    }

    /// Get a request by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such request.
    #[instrument(skip(self), fields(request_id = %id))]
    pub async fn get(&self, id: &CustomRequestId) -> Result<CustomRequest, RepositoryError> {
        let c = self.collection;
        let doc: Document<CustomRequestRecord> = c
            .client
            .get_document(c.database_id, c.collection_id, id.as_str())
            .await?;
        Ok(doc.into())
    }

    /// Set a request's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such request.
    #[instrument(skip(self), fields(request_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: &CustomRequestId,
        status: RequestStatus,
    ) -> Result<CustomRequest, RepositoryError> {
        let c = self.collection;
        let doc: Document<CustomRequestRecord> = c
            .client
            .update_document(
                c.database_id,
                c.collection_id,
                id.as_str(),
                &StatusUpdate { status },
            )
            .await?;
        Ok(doc.into())
    }

    async fn list(&self, queries: Vec<Query>) -> Result<Vec<CustomRequest>, RepositoryError> {
        let c = self.collection;
        let docs: Vec<Document<CustomRequestRecord>> = c
            .client
            .list_all_documents(c.database_id, c.collection_id, &queries)
            .await?;
        Ok(docs.into_iter().map(CustomRequest::from).collect())
    }
}
