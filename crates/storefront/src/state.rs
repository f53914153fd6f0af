//! Shared storefront handle.

use std::sync::Arc;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::StorefrontConfig;
use crate::services::catalog::{CatalogCache, new_cache};
use crate::services::{AdminService, AuthService, CatalogService, OrderService, RequestService};

/// Configuration, backend client and catalog cache.
///
/// This struct is cheaply cloneable via `Arc`; clones share the login
/// session and the cache.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    client: AppwriteClient,
    catalog_cache: CatalogCache,
}

impl Storefront {
    /// Create a new storefront handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built from the
    /// configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppwriteError> {
        let client = AppwriteClient::new(&config.appwrite)?;
        let catalog_cache = new_cache(config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                client,
                catalog_cache,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn client(&self) -> &AppwriteClient {
        &self.inner.client
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.client(), self.config())
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(
            self.client(),
            &self.config().appwrite,
            &self.inner.catalog_cache,
        )
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(
            self.client(),
            &self.config().appwrite,
            self.config().tax_rate,
        )
    }

    #[must_use]
    pub fn requests(&self) -> RequestService<'_> {
        RequestService::new(self.client(), &self.config().appwrite)
    }

    #[must_use]
    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self.catalog(), self.orders(), self.requests())
    }
}
