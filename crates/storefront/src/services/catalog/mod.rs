//! Catalog service: products, filtering and categories.
//!
//! Product reads are cached with `moka` for the configured TTL. Creating a
//! product invalidates the cached listing.

mod cache;

pub use cache::{CatalogCache, CatalogKey, CatalogValue, new_cache};

use std::sync::Arc;

use layercraft_core::ProductId;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::appwrite::AppwriteClient;
use crate::config::AppwriteConfig;
use crate::db::ProductRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::models::{NewProduct, Product, ProductFilter};

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig, cache: &'a CatalogCache) -> Self {
        Self {
            products: ProductRepository::new(client, config),
            cache,
        }
    }

    /// Validate and store a new product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name or category or a
    /// negative price, and `AppError::Database` if the backend rejects it.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let product = validate_product(product)?;
        let created = self.products.create(&product).await?;

        self.cache.invalidate(&CatalogKey::AllProducts).await;
        info!(product_id = %created.id, "Product created");

        Ok(created)
    }

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the backend listing fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        if let Some(CatalogValue::Products(products)) =
            self.cache.get(&CatalogKey::AllProducts).await
        {
            debug!("Cache hit for product listing");
            return Ok(products.as_ref().clone());
        }

        let products = self.products.list().await?;
        self.cache
            .insert(
                CatalogKey::AllProducts,
                CatalogValue::Products(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let key = CatalogKey::Product(id.clone());

        if let Some(CatalogValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(product.as_ref().clone());
        }

        let product = self
            .products
            .get(id)
            .await
            .map_err(not_found_as(format!("Product {id}")))?;
        self.cache
            .insert(key, CatalogValue::Product(Arc::new(product.clone())))
            .await;

        Ok(product)
    }
}

/// Products passing `filter`, in catalog order.
#[must_use]
pub fn filter<'p>(products: &'p [Product], filter: &ProductFilter) -> Vec<&'p Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

/// Distinct categories in the order they first appear.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

fn validate_product(mut product: NewProduct) -> Result<NewProduct> {
    product.name = product.name.trim().to_string();
    product.category = product.category.trim().to_string();

    if product.name.is_empty() {
        return Err(AppError::Validation("Product name is required".to_string()));
    }
    if product.category.is_empty() {
        return Err(AppError::Validation("Product category is required".to_string()));
    }
    if product.price < Decimal::ZERO {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::fixtures::product;

    fn in_category(id: &str, category: &str) -> Product {
        let mut p = product(id, 10);
        p.category = category.to_string();
        p
    }

    fn new_product(name: &str, category: &str, price: Decimal) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            image: String::new(),
            description: String::new(),
            detailed_description: String::new(),
            category: category.to_string(),
            price,
            customizable: false,
            dimensions: String::new(),
            material: String::new(),
            weight: String::new(),
        }
    }

    #[test]
    fn test_categories_first_seen_order() {
        let products = vec![
            in_category("a", "Toys"),
            in_category("b", "Decor"),
            in_category("c", "Toys"),
            in_category("d", "Planters"),
        ];
        assert_eq!(categories(&products), ["Toys", "Decor", "Planters"]);
    }

    #[test]
    fn test_filter_keeps_catalog_order() {
        let products = vec![
            in_category("a", "Toys"),
            in_category("b", "Decor"),
            in_category("c", "Toys"),
        ];
        let ids: Vec<&str> = filter(&products, &ProductFilter::category("Toys"))
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_validate_product_trims() {
        let product = validate_product(new_product("  Vase ", " Decor", Decimal::ONE));
        assert!(matches!(product, Ok(ref p) if p.name == "Vase" && p.category == "Decor"));
    }

    #[test]
    fn test_validate_product_rejects_bad_input() {
        assert!(matches!(
            validate_product(new_product(" ", "Decor", Decimal::ONE)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_product(new_product("Vase", "", Decimal::ONE)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_product(new_product("Vase", "Decor", Decimal::NEGATIVE_ONE)),
            Err(AppError::Validation(_))
        ));
        assert!(validate_product(new_product("Vase", "Decor", Decimal::ZERO)).is_ok());
    }
}
