//! Client for the hosted backend's REST API (Appwrite-compatible).
//!
//! # Architecture
//!
//! - Thin `reqwest` client; the backend is the source of truth for
//!   accounts, sessions and documents. Nothing is synced locally.
//! - The login session lives in the backend's session cookie, kept in the
//!   client's cookie store. Cloning the client shares the session.
//! - A server API key, when configured, is sent on every request and
//!   bypasses document permissions (CLI and admin tooling only).
//!
//! # APIs
//!
//! ## Account
//! - Sign up, email/password sessions, logout, current account
//!
//! ## Databases
//! - Create, get, list (with [`Query`] filters) and update documents
//!
//! # Example
//!
//! ```rust,ignore
//! use layercraft_storefront::appwrite::{AppwriteClient, Query};
//!
//! let client = AppwriteClient::new(&config.appwrite)?;
//! client.create_email_session(&email, &password).await?;
//!
//! let orders: DocumentList<Order> = client
//!     .list_documents(db, "orders", &[Query::equal("userId", user_id.as_str())])
//!     .await?;
//! ```

mod account;
mod databases;
mod query;
mod types;

pub use query::Query;
pub use types::{Account, Document, DocumentList, Session};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::AppwriteConfig;
use types::ErrorBody;

/// Response format the models in this module are written against.
const RESPONSE_FORMAT: &str = "1.5.0";

/// Request timeout for every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How much of an unexpected response body to keep in logs and errors.
const BODY_SNIPPET_CHARS: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum AppwriteError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No valid session, or the session lacks the required scope.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Document, collection or account not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// ID or unique attribute already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other error response.
    #[error("API error {status} ({kind}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Backend error type (e.g., `document_invalid_structure`).
        kind: String,
        /// Human-readable message from the backend.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configured endpoint cannot carry the request path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configured project ID or API key is not a valid header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

// =============================================================================
// AppwriteClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session
/// cookie.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<AppwriteClientInner>,
}

struct AppwriteClientInner {
    client: reqwest::Client,
    endpoint: Url,
    project_id: String,
}

impl AppwriteClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the project ID or API key cannot be sent as a
    /// header, or the HTTP client fails to build.
    pub fn new(config: &AppwriteConfig) -> Result<Self, AppwriteError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id)
                .map_err(|e| AppwriteError::InvalidHeader(format!("project id: {e}")))?,
        );
        headers.insert(
            "X-Appwrite-Response-Format",
            HeaderValue::from_static(RESPONSE_FORMAT),
        );

        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret())
                .map_err(|e| AppwriteError::InvalidHeader(format!("api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert("X-Appwrite-Key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AppwriteClientInner {
                client,
                endpoint: config.endpoint.clone(),
                project_id: config.project_id.clone(),
            }),
        })
    }

    /// Project ID this client talks to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, AppwriteError> {
        let mut url = self.inner.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppwriteError::InvalidUrl(format!(
                    "endpoint cannot be a base: {}",
                    self.inner.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppwriteError> {
        let body = self.send_raw(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&body),
                "Failed to parse backend response"
            );
            AppwriteError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant (e.g., 204 No Content).
    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<(), AppwriteError> {
        self.send_raw(request).await.map(|_| ())
    }

    /// Send a request, mapping error statuses, and return the body text.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, AppwriteError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            tracing::warn!(retry_after, "Backend rate limit hit");
            return Err(AppwriteError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        Err(error_from_response(status, &body))
    }
}

/// Map an error response to an [`AppwriteError`].
fn error_from_response(status: reqwest::StatusCode, body: &str) -> AppwriteError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (kind, message) = parsed.map_or_else(
        || ("unknown".to_string(), snippet(body)),
        |e| (e.kind, e.message),
    );

    match status.as_u16() {
        401 => AppwriteError::Unauthorized(message),
        404 => AppwriteError::NotFound(message),
        409 => AppwriteError::Conflict(message),
        code => {
            tracing::error!(
                status = code,
                kind = %kind,
                message = %message,
                "Backend returned non-success status"
            );
            AppwriteError::Api {
                status: code,
                kind,
                message,
            }
        }
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> AppwriteConfig {
        AppwriteConfig::for_tests(endpoint)
    }

    #[test]
    fn test_url_joins_segments() {
        let client = AppwriteClient::new(&config("https://cloud.appwrite.io/v1/")).unwrap();
        let url = client
            .url(&["databases", "store", "collections", "products", "documents"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.appwrite.io/v1/databases/store/collections/products/documents"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = AppwriteClient::new(&config("http://localhost/v1/")).unwrap();
        let url = client.url(&["account", "sessions", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/v1/account/sessions/a%20b");
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"message":"Document with the requested ID could not be found.","code":404,"type":"document_not_found","version":"1.5.7"}"#;
        let err = error_from_response(reqwest::StatusCode::NOT_FOUND, body);
        assert!(
            matches!(err, AppwriteError::NotFound(ref m) if m.starts_with("Document with the requested ID"))
        );

        let err = error_from_response(reqwest::StatusCode::CONFLICT, body);
        assert!(matches!(err, AppwriteError::Conflict(_)));

        let err = error_from_response(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(
            err,
            AppwriteError::Api { status: 400, ref kind, .. } if kind == "document_not_found"
        ));
    }

    #[test]
    fn test_error_mapping_non_json_body() {
        let err = error_from_response(reqwest::StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        assert_eq!(
            err.to_string(),
            "API error 502 (unknown): <html>upstream</html>"
        );
    }

    #[test]
    fn test_rate_limited_display() {
        let err = AppwriteError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
