//! Admin dashboard.

use layercraft_core::{CurrencyCode, OrderStatus, Price, RequestStatus};
use serde::Serialize;
use tracing::{error, instrument};

use super::catalog::CatalogService;
use super::orders::OrderService;
use super::requests::RequestService;
use crate::error::{AppError, Result};
use crate::models::{CustomRequest, Order, Product, User};

/// Number of recent requests shown on the dashboard.
pub const RECENT_REQUESTS: usize = 5;

/// Number of products shown on the dashboard.
pub const FEATURED_PRODUCTS: usize = 6;

/// Headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_requests: usize,
    pub pending_requests: usize,
    /// Orders not yet delivered or cancelled.
    pub active_orders: usize,
    /// Sum of order totals, excluding cancelled orders.
    pub revenue: Price,
    /// Sum of one unit of every catalog product.
    pub catalog_value: Price,
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    /// Most recent requests first.
    pub recent_requests: Vec<CustomRequest>,
    /// First products of the catalog.
    pub featured_products: Vec<Product>,
    /// Size of the full catalog, for the "view all" link.
    pub product_count: usize,
}

/// Admin service.
pub struct AdminService<'a> {
    catalog: CatalogService<'a>,
    orders: OrderService<'a>,
    requests: RequestService<'a>,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub fn new(
        catalog: CatalogService<'a>,
        orders: OrderService<'a>,
        requests: RequestService<'a>,
    ) -> Self {
        Self {
            catalog,
            orders,
            requests,
        }
    }

    /// Build the dashboard for `user`.
    ///
    /// Sections whose data fails to load are logged and shown empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `user` is an admin.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn dashboard(&self, user: &User) -> Result<Dashboard> {
        if !user.is_admin() {
            return Err(AppError::Forbidden("admin dashboard".to_string()));
        }

        let (products, requests, orders) = tokio::join!(
            self.catalog.list_products(),
            self.requests.all_requests(),
            self.orders.all_orders(),
        );

        let products = products.unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch products");
            Vec::new()
        });
        let requests = requests.unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch custom requests");
            Vec::new()
        });
        let orders = orders.unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch orders");
            Vec::new()
        });

        Ok(build_dashboard(products, requests, &orders))
    }
}

fn build_dashboard(
    mut products: Vec<Product>,
    mut requests: Vec<CustomRequest>,
    orders: &[Order],
) -> Dashboard {
    let zero = Price::zero(CurrencyCode::USD);

    let stats = DashboardStats {
        total_products: products.len(),
        total_requests: requests.len(),
        pending_requests: requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count(),
        active_orders: orders.iter().filter(|o| o.status.is_active()).count(),
        revenue: orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .fold(zero, |acc, o| acc + o.total_amount),
        catalog_value: products.iter().fold(zero, |acc, p| acc + p.price),
    };

    requests.sort_by(|a, b| b.request_date.cmp(&a.request_date));
    requests.truncate(RECENT_REQUESTS);

    let product_count = products.len();
    products.truncate(FEATURED_PRODUCTS);

    Dashboard {
        stats,
        recent_requests: requests,
        featured_products: products,
        product_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use layercraft_core::{CustomRequestId, Email, OrderId, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::product::fixtures::product;

    fn request(id: &str, status: RequestStatus, days_ago: i64) -> CustomRequest {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        CustomRequest {
            id: CustomRequestId::new(id),
            user_id: UserId::new("u1"),
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            product_id: None,
            message: "Custom dragon".to_string(),
            status,
            request_date: base - Duration::days(days_ago),
        }
    }

    fn order(id: &str, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new("u1"),
            items: Vec::new(),
            total_amount: Price::usd(Decimal::new(total, 0)),
            status,
            shipping_address: "1 Main St".to_string(),
            order_date: Utc::now(),
        }
    }

    #[test]
    fn test_stats() {
        let products = vec![product("a", 10), product("b", 25)];
        let requests = vec![
            request("r1", RequestStatus::Pending, 3),
            request("r2", RequestStatus::Approved, 2),
            request("r3", RequestStatus::Pending, 1),
        ];
        let orders = vec![
            order("o1", OrderStatus::Pending, 40),
            order("o2", OrderStatus::Delivered, 60),
            order("o3", OrderStatus::Cancelled, 100),
        ];

        let dashboard = build_dashboard(products, requests, &orders);
        let stats = dashboard.stats;

        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.pending_requests, 2);
        assert_eq!(stats.active_orders, 1);
        assert_eq!(stats.revenue.display(), "$100.00");
        assert_eq!(stats.catalog_value.display(), "$35.00");
    }

    #[test]
    fn test_recent_requests_newest_first_and_capped() {
        let requests: Vec<CustomRequest> = (0..8)
            .map(|i| request(&format!("r{i}"), RequestStatus::Pending, i))
            .collect();

        let dashboard = build_dashboard(Vec::new(), requests, &[]);
        let ids: Vec<&str> = dashboard
            .recent_requests
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["r0", "r1", "r2", "r3", "r4"]);
        assert_eq!(dashboard.stats.total_requests, 8);
    }

    #[test]
    fn test_featured_products_capped() {
        let products: Vec<Product> = (0..9).map(|i| product(&format!("p{i}"), 5)).collect();

        let dashboard = build_dashboard(products, Vec::new(), &[]);
        assert_eq!(dashboard.featured_products.len(), FEATURED_PRODUCTS);
        assert_eq!(dashboard.product_count, 9);
        assert_eq!(dashboard.featured_products[0].id.as_str(), "p0");
    }
}
