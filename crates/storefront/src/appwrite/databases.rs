//! Database service: document create, read, list and update.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::query::{MAX_LIMIT, Query};
use super::types::{Document, DocumentList};
use super::{AppwriteClient, AppwriteError};

/// Page size used by [`AppwriteClient::list_all_documents`].
const PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentBody<'a, D: ?Sized> {
    document_id: &'a str,
    data: &'a D,
}

#[derive(Serialize)]
struct UpdateDocumentBody<'a, D: ?Sized> {
    data: &'a D,
}

impl AppwriteClient {
    fn documents_url(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: Option<&str>,
    ) -> Result<Url, AppwriteError> {
        let mut segments = vec![
            "databases",
            database_id,
            "collections",
            collection_id,
            "documents",
        ];
        if let Some(id) = document_id {
            segments.push(id);
        }
        self.url(&segments)
    }

    /// Create a document with the given ID.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Conflict` if the ID exists, or `Api` if `data`
    /// does not match the collection's attributes.
    #[instrument(skip(self, data), fields(collection = %collection_id, document = %document_id))]
    pub async fn create_document<D, T>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &D,
    ) -> Result<Document<T>, AppwriteError>
    where
        D: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.documents_url(database_id, collection_id, None)?;
        let body = CreateDocumentBody { document_id, data };

        self.send(self.http().post(url).json(&body)).await
    }

    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::NotFound` if the document does not exist or is
    /// not readable with the current session.
    #[instrument(skip(self), fields(collection = %collection_id, document = %document_id))]
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document<T>, AppwriteError> {
        let url = self.documents_url(database_id, collection_id, Some(document_id))?;
        self.send(self.http().get(url)).await
    }

    /// List one page of documents matching `queries`.
    ///
    /// Without a `limit` query the backend returns its default page (25).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a query is invalid.
    #[instrument(skip(self, queries), fields(collection = %collection_id, queries = queries.len()))]
    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>, AppwriteError> {
        let mut url = self.documents_url(database_id, collection_id, None)?;
        if !queries.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for query in queries {
                pairs.append_pair("queries[]", &query.to_string());
            }
        }

        self.send(self.http().get(url)).await
    }

    /// List every document matching `queries`, following offset pages.
    ///
    /// Paging queries in `queries` are replaced.
    ///
    /// # Errors
    ///
    /// Returns the first failing page's error.
    pub async fn list_all_documents<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<Vec<Document<T>>, AppwriteError> {
        let filters: Vec<Query> = queries.iter().filter(|q| !q.is_paging()).cloned().collect();
        let mut documents = Vec::new();

        loop {
            let mut page_queries = filters.clone();
            page_queries.push(Query::limit(PAGE_SIZE.min(MAX_LIMIT)));
            page_queries.push(Query::offset(documents.len() as u64));

            let page: DocumentList<T> = self
                .list_documents(database_id, collection_id, &page_queries)
                .await?;
            let fetched = page.documents.len();
            documents.extend(page.documents);

            debug!(
                collection = %collection_id,
                fetched,
                total = page.total,
                "Fetched document page"
            );

            if fetched < PAGE_SIZE as usize || documents.len() as u64 >= page.total {
                return Ok(documents);
            }
        }
    }

    /// Update some attributes of a document.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::NotFound` if the document does not exist.
    #[instrument(skip(self, data), fields(collection = %collection_id, document = %document_id))]
    pub async fn update_document<D, T>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &D,
    ) -> Result<Document<T>, AppwriteError>
    where
        D: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.documents_url(database_id, collection_id, Some(document_id))?;
        let body = UpdateDocumentBody { data };

        self.send(self.http().patch(url).json(&body)).await
    }
}
