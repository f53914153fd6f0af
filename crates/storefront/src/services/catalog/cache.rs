//! Cache types for catalog reads.

use std::sync::Arc;
use std::time::Duration;

use layercraft_core::ProductId;
use moka::future::Cache;

use crate::models::Product;

/// Maximum number of cached entries.
const MAX_CAPACITY: u64 = 1000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CatalogKey {
    AllProducts,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CatalogValue {
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Shared catalog cache.
pub type CatalogCache = Cache<CatalogKey, CatalogValue>;

/// Build a catalog cache whose entries expire after `ttl`.
#[must_use]
pub fn new_cache(ttl: Duration) -> CatalogCache {
    Cache::builder()
        .max_capacity(MAX_CAPACITY)
        .time_to_live(ttl)
        .build()
}
