//! Layercraft Core - Shared types library.
//!
//! This crate provides common types used across all Layercraft components:
//! - `storefront` - Client library for the hosted backend (catalog, cart, orders, requests)
//! - `cli` - Command-line tools for catalog seeding and admin work
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere, including WASM front ends.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
