//! Integration tests for GoMarketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Saving and restoring the cart through real storage
//! - `cart_provider` - Scoped access and change subscriptions
//!
//! This library holds the fixtures the test files share.

use std::path::Path;
use std::sync::Arc;

use go_marketplace_cart::{CartOptions, CartStore, FileStore};
use go_marketplace_core::{NewCartItem, Price, ProductId};

/// Parse a product ID, panicking on invalid test input.
///
/// # Panics
///
/// Panics if `raw` is not a valid product ID.
#[must_use]
pub fn product_id(raw: &str) -> ProductId {
    ProductId::parse(raw).unwrap_or_else(|e| panic!("invalid test product id {raw:?}: {e}"))
}

/// A catalog product with a predictable title, image, and price.
#[must_use]
pub fn product(raw: &str, cents: i64) -> NewCartItem {
    NewCartItem::new(
        product_id(raw),
        format!("Product {raw}"),
        format!("https://cdn.example.com/products/{raw}.png"),
        Price::from_cents(cents),
    )
}

/// Open a cart backed by a file store in `dir`.
pub async fn open_file_cart(dir: &Path) -> CartStore {
    CartStore::open(Arc::new(FileStore::new(dir)), CartOptions::default()).await
}
