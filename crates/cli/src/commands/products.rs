//! Catalog commands.
//!
//! # Seed file format
//!
//! ```yaml
//! products:
//!   - name: Spiral Vase
//!     category: Decor
//!     price: 34.5
//!     image: https://cdn.example.com/spiral-vase.jpg
//!     description: Twisted vase for dried flowers
//!     customizable: true
//! ```

use layercraft_core::ProductId;
use layercraft_storefront::Storefront;
use layercraft_storefront::models::{NewProduct, Product, ProductFilter};
use layercraft_storefront::services::catalog;
use serde::Deserialize;
use tracing::{info, warn};

use super::{CliError, require_api_key};

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

/// List products, optionally filtered.
pub async fn list(
    storefront: &Storefront,
    category: Option<String>,
    search: Option<String>,
) -> Result<(), CliError> {
    let products = storefront.catalog().list_products().await?;
    let filter = ProductFilter { search, category };
    let visible = catalog::filter(&products, &filter);

    for product in &visible {
        info!(
            "{}  {:<32} {:<12} {}",
            product.id,
            product.name,
            product.category,
            product.price
        );
    }
    info!(
        "{} of {} products; categories: {}",
        visible.len(),
        products.len(),
        catalog::categories(&products).join(", ")
    );
    Ok(())
}

/// Show one product in full.
pub async fn show(storefront: &Storefront, id: &str) -> Result<(), CliError> {
    let product = storefront.catalog().get_product(&ProductId::new(id)).await?;
    print_product(&product);
    Ok(())
}

/// Create every product in a seed file.
pub async fn seed(storefront: &Storefront, path: &str) -> Result<(), CliError> {
    require_api_key(storefront, "products seed")?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        })?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    info!(path = %path, products = file.products.len(), "Seeding products");

    let catalog = storefront.catalog();
    let mut created = 0usize;
    for product in file.products {
        let name = product.name.clone();
        match catalog.create_product(product).await {
            Ok(product) => {
                created += 1;
                info!(product_id = %product.id, "Created {name}");
            }
            Err(e) => warn!(error = %e, "Skipped {name}"),
        }
    }

    info!("Seeded {created} products");
    Ok(())
}

fn print_product(product: &Product) {
    info!("{} ({})", product.name, product.id);
    info!("  Category:     {}", product.category);
    info!("  Price:        {}", product.price);
    info!("  Customizable: {}", if product.customizable { "yes" } else { "no" });
    info!("  Dimensions:   {}", product.dimensions);
    info!("  Material:     {}", product.material);
    info!("  Weight:       {}", product.weight);
    info!("  Image:        {}", product.image);
    info!("  {}", product.description);
    if !product.detailed_description.is_empty() {
        info!("  {}", product.detailed_description);
    }
}
