//! Order service: checkout and order management.

use layercraft_core::{OrderId, OrderStatus, UserId};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::appwrite::AppwriteClient;
use crate::cart::Cart;
use crate::config::AppwriteConfig;
use crate::db::OrderRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::models::{NewOrder, Order, User};

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    tax_rate: Decimal,
}

impl<'a> OrderService<'a> {
    /// Create a new order service charging `tax_rate` at checkout.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig, tax_rate: Decimal) -> Self {
        Self {
            orders: OrderRepository::new(client, config),
            tax_rate,
        }
    }

    /// Place an order for the cart's contents.
    ///
    /// The cart is not modified; callers clear it once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty cart or blank address.
    #[instrument(skip(self, user, cart, shipping_address), fields(user_id = %user.id, items = cart.total_items()))]
    pub async fn checkout(&self, user: &User, cart: &Cart, shipping_address: &str) -> Result<Order> {
        if cart.is_empty() {
            return Err(AppError::Validation("Your cart is empty".to_string()));
        }

        let summary = cart.summary(self.tax_rate);
        self.create_order(NewOrder {
            user_id: user.id.clone(),
            items: cart.to_order_lines(),
            total_amount: summary.total.amount,
            status: OrderStatus::Pending,
            shipping_address: shipping_address.to_string(),
        })
        .await
    }

    /// Store an order, dated now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the order has no lines, a line has
    /// zero quantity, or the shipping address is blank.
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    pub async fn create_order(&self, mut order: NewOrder) -> Result<Order> {
        order.shipping_address = order.shipping_address.trim().to_string();

        if order.items.is_empty() {
            return Err(AppError::Validation("Your cart is empty".to_string()));
        }
        if order.items.iter().any(|line| line.quantity == 0) {
            return Err(AppError::Validation(
                "Order quantities must be at least 1".to_string(),
            ));
        }
        if order.shipping_address.is_empty() {
            return Err(AppError::Validation(
                "Shipping address is required".to_string(),
            ));
        }

        let order = self.orders.create(order).await?;
        info!(order_id = %order.id, total = %order.total_amount, "Order placed");
        Ok(order)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the listing fails.
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the listing fails.
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.list_all().await?)
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown order.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let updated = self
            .orders
            .update_status(id, status)
            .await
            .map_err(not_found_as(format!("Order {id}")))?;
        info!(status = %updated.status, "Order status updated");
        Ok(updated)
    }
}
