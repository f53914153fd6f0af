//! Admin dashboard command.

use layercraft_storefront::{Store, Storefront};
use tracing::info;

use super::CliError;

/// Log in as an admin and print the dashboard.
pub async fn show(storefront: Storefront, email: &str, password: &str) -> Result<(), CliError> {
    let mut store = Store::new(storefront);
    store.login(email, password).await?;

    let dashboard = store.dashboard().await;
    // Log out regardless of the dashboard outcome.
    let logout = store.logout().await;
    let dashboard = dashboard?;
    logout?;

    let stats = dashboard.stats;
    info!("Products:          {}", stats.total_products);
    info!("Custom requests:   {} ({} pending)", stats.total_requests, stats.pending_requests);
    info!("Active orders:     {}", stats.active_orders);
    info!("Revenue:           {}", stats.revenue);
    info!("Catalog value:     {}", stats.catalog_value);

    info!("Recent requests:");
    if dashboard.recent_requests.is_empty() {
        info!("  (none)");
    }
    for request in &dashboard.recent_requests {
        info!(
            "  {}  {:<9} {} <{}>",
            request.id, request.status, request.name, request.email
        );
    }

    info!("Products:");
    for product in &dashboard.featured_products {
        info!("  {}  {} ({})", product.id, product.name, product.price);
    }
    if dashboard.product_count > dashboard.featured_products.len() {
        info!("  ... view all {} products", dashboard.product_count);
    }

    Ok(())
}
