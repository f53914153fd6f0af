//! Order commands.

use layercraft_core::{OrderId, OrderStatus, UserId};
use layercraft_storefront::Storefront;
use tracing::info;

use super::{CliError, require_api_key};

/// List orders, newest first.
pub async fn list(storefront: &Storefront, user: Option<&str>) -> Result<(), CliError> {
    require_api_key(storefront, "orders list")?;

    let service = storefront.orders();
    let orders = match user {
        Some(user_id) => service.orders_for_user(&UserId::new(user_id)).await?,
        None => service.all_orders().await?,
    };

    for order in &orders {
        let units: u32 = order.items.iter().map(|line| line.quantity).sum();
        info!(
            "{}  {:<10} {}  {:>10}  {} items  {}",
            order.id,
            order.status,
            order.order_date.format("%Y-%m-%d"),
            order.total_amount,
            units,
            order.shipping_address
        );
    }
    info!("{} orders", orders.len());
    Ok(())
}

/// Move an order to a new status.
pub async fn set_status(storefront: &Storefront, id: &str, status: &str) -> Result<(), CliError> {
    require_api_key(storefront, "orders set-status")?;

    let status: OrderStatus = status.parse()?;
    let order = storefront
        .orders()
        .update_status(&OrderId::new(id), status)
        .await?;

    info!("Order {} is now {}", order.id, order.status);
    Ok(())
}
