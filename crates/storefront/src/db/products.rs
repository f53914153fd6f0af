//! Product repository.

use layercraft_core::ProductId;
use tracing::instrument;

use super::{Collection, RepositoryError};
use crate::appwrite::{AppwriteClient, Document, Query};
use crate::config::AppwriteConfig;
use crate::models::{NewProduct, Product};

/// Repository for the products collection.
pub struct ProductRepository<'a> {
    collection: Collection<'a>,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig) -> Self {
        Self {
            collection: Collection::new(client, config, &config.collections.products),
        }
    }

    /// Store a new product under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the backend rejects the document.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let c = self.collection;
        let id = ProductId::unique();
        let doc: Document<NewProduct> = c
            .client
            .create_document(c.database_id, c.collection_id, id.as_str(), product)
            .await?;
        Ok(doc.into())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let c = self.collection;
        let doc: Document<NewProduct> = c
            .client
            .get_document(c.database_id, c.collection_id, id.as_str())
            .await?;
        Ok(doc.into())
    }

    /// List every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if a page fails to load.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let c = self.collection;
        let docs: Vec<Document<NewProduct>> = c
            .client
            .list_all_documents(
                c.database_id,
                c.collection_id,
                &[Query::order_asc("$createdAt")],
            )
            .await?;
        Ok(docs.into_iter().map(Product::from).collect())
    }
}
