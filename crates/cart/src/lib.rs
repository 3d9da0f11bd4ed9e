//! GoMarketplace Cart - Persistent shopping cart store.
//!
//! Keeps the shopper's cart in memory and mirrors it to device-local
//! key-value storage after every change.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use go_marketplace_cart::{CartOptions, CartStore, FileStore};
//! use go_marketplace_core::{NewCartItem, Price, ProductId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStore::new(".gomarketplace"));
//! let cart = CartStore::open(storage, CartOptions::default()).await;
//!
//! let id = ProductId::parse("1")?;
//! let chair = NewCartItem::new(
//!     id.clone(),
//!     "Chair",
//!     "https://cdn.example.com/chair.png",
//!     Price::from_cents(1999),
//! );
//! cart.add_to_cart(chair).await;
//! cart.increment(&id).await;
//! assert_eq!(cart.total_quantity(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`store`] - The cart state and its mutations
//! - [`storage`] - Key-value backends the cart is saved to
//! - [`provider`] - Task-scoped access for code that cannot take a handle
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
mod persist;
pub mod provider;
pub mod storage;
pub mod store;

pub use error::{CartError, Result};
pub use provider::{provide_cart, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartOptions, CartStore, DEFAULT_STORAGE_KEY, Hydration};
