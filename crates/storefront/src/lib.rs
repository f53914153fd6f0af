//! Layercraft storefront library.
//!
//! Client for a storefront selling customizable 3D-printed art: catalog,
//! cart, checkout, custom order requests, authentication and the admin
//! dashboard. All persistence lives in a hosted backend (Appwrite-compatible
//! account and document database APIs).
//!
//! # Layers
//!
//! - [`store::Store`] - Client-side state (products, cart, requests, user)
//! - [`state::Storefront`] - Shared handle: config, backend client, caches
//! - [`services`] - Auth, catalog, orders, requests, admin
//! - [`db`] - Repositories over the backend collections
//! - [`appwrite`] - REST client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod appwrite;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

pub use error::{AppError, Result};
pub use state::Storefront;
pub use store::{ProvisionalRequest, StatusChange, Store};
