//! GoMarketplace Core - Shared cart types.
//!
//! This crate provides the value types used across all GoMarketplace components:
//! - `cart` - The cart store and its persistence
//! - `cli` - Command-line driver for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, quantities, and cart items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
