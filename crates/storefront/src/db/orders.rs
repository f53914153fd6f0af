//! Order repository.

use chrono::Utc;
use layercraft_core::{OrderId, OrderStatus, UserId};
use serde::Serialize;
use tracing::instrument;

use super::{Collection, RepositoryError};
use crate::appwrite::{AppwriteClient, Document, Query};
use crate::config::AppwriteConfig;
use crate::models::order::OrderRecord;
use crate::models::{NewOrder, Order};

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// Repository for the orders collection.
pub struct OrderRepository<'a> {
    collection: Collection<'a>,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig) -> Self {
        Self {
            collection: Collection::new(client, config, &config.collections.orders),
        }
    }

    /// Store a new order, dated now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the backend rejects the document.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.items.len()))]
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let c = self.collection;
        let id = OrderId::unique();
        let record = OrderRecord::new(order, Utc::now());
        let doc: Document<OrderRecord> = c
            .client
            .create_document(c.database_id, c.collection_id, id.as_str(), &record)
            .await?;
        Ok(doc.into())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such order.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let c = self.collection;
        let doc: Document<OrderRecord> = c
            .client
            .get_document(c.database_id, c.collection_id, id.as_str())
            .await?;
        Ok(doc.into())
    }

    /// Orders placed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if a page fails to load.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        self.list(vec![
            Query::equal("userId", user_id.as_str()),
            Query::order_desc("$createdAt"),
        ])
        .await
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if a page fails to load.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.list(vec![Query::order_desc("$createdAt")]).await
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such order.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let c = self.collection;
        let doc: Document<OrderRecord> = c
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

    async fn list(&self, queries: Vec<Query>) -> Result<Vec<Order>, RepositoryError> {
        let c = self.collection;
        let docs: Vec<Document<OrderRecord>> = c
            .client
            .list_all_documents(c.database_id, c.collection_id, &queries)
            .await?;
        Ok(docs.into_iter().map(Order::from).collect())
    }
}
