//! Domain models for the storefront.
//!
//! Each entity has a wire record (the document attributes as stored on the
//! backend) and a domain type carrying the document ID. Repositories convert
//! between the two.

pub mod order;
pub mod product;
pub mod request;
pub mod user;

pub use order::{NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductFilter};
pub use request::{CustomRequest, NewCustomRequest};
pub use user::{NewProfile, User, UserProfile};
