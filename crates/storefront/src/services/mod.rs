//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-up, login, logout and current-user resolution
//! - `catalog` - Products (cached), filtering and categories
//! - `orders` - Checkout and order management
//! - `requests` - Custom order requests
//! - `admin` - Admin dashboard
//!
//! Services borrow the shared [`Storefront`](crate::state::Storefront)
//! handle's client and configuration; get them from its accessors.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod orders;
pub mod requests;

pub use admin::{AdminService, Dashboard, DashboardStats};
pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use requests::RequestService;
