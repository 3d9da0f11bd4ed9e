//! Cart commands.
//!
//! Each command opens the cart from the file store, applies one change, and
//! prints the resulting cart.
//!
//! # Usage
//!
//! ```bash
//! gm-cli show
//! gm-cli add --id 1 --title "Chair" --image-url https://cdn.example.com/chair.png --price 19.99
//! gm-cli increment 1
//! gm-cli decrement 1
//! gm-cli clear-saved
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use go_marketplace_cart::{CartStore, FileStore, KeyValueStore, StorageError};
use go_marketplace_core::{CartItem, NewCartItem, ProductId};
use thiserror::Error;

use crate::config::CliConfig;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The change was applied but could not be saved.
    #[error("Cart was updated but not saved: {0}")]
    NotSaved(String),
}

/// Open the cart described by `config`.
async fn open(config: &CliConfig) -> CartStore {
    let storage = Arc::new(FileStore::new(config.storage_dir.clone()));
    tracing::debug!(dir = %config.storage_dir.display(), "Opening cart");
    CartStore::open(storage, config.cart.clone()).await
}

/// Fail if the last mutation's write did not reach storage.
fn ensure_saved(cart: &CartStore) -> Result<(), CommandError> {
    cart.last_persist_error()
        .map_or(Ok(()), |e| Err(CommandError::NotSaved(e)))
}

/// Print the saved cart.
pub async fn show(config: &CliConfig) {
    let cart = open(config).await;
    print_cart(&cart.items());
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns `CommandError::NotSaved` if the updated cart could not be written.
pub async fn add(config: &CliConfig, item: NewCartItem) -> Result<(), CommandError> {
    let cart = open(config).await;
    tracing::info!(id = %item.id, "Adding to cart");
    cart.add_to_cart(item).await;
    ensure_saved(&cart)?;
    print_cart(&cart.items());
    Ok(())
}

/// Add one unit of a product already in the cart.
///
/// # Errors
///
/// Returns `CommandError::NotSaved` if the updated cart could not be written.
pub async fn increment(config: &CliConfig, id: &ProductId) -> Result<(), CommandError> {
    let cart = open(config).await;
    if cart.get(id).is_none() {
        tracing::warn!(%id, "Product is not in the cart");
    }
    cart.increment(id).await;
    ensure_saved(&cart)?;
    print_cart(&cart.items());
    Ok(())
}

/// Remove one unit of a product.
///
/// # Errors
///
/// Returns `CommandError::NotSaved` if the updated cart could not be written.
pub async fn decrement(config: &CliConfig, id: &ProductId) -> Result<(), CommandError> {
    let cart = open(config).await;
    if cart.get(id).is_none() {
        tracing::warn!(%id, "Product is not in the cart");
    }
    cart.decrement(id).await;
    ensure_saved(&cart)?;
    print_cart(&cart.items());
    Ok(())
}

/// Delete the saved cart.
///
/// # Errors
///
/// Returns `CommandError::Storage` if the storage file cannot be updated.
pub async fn clear_saved(config: &CliConfig) -> Result<(), CommandError> {
    let storage = FileStore::new(config.storage_dir.clone());
    storage.remove(&config.cart.storage_key).await?;
    tracing::info!(key = %config.cart.storage_key, "Removed saved cart");
    Ok(())
}

fn print_cart(items: &[CartItem]) {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(items));
    }
}

/// Format the cart as a plain-text table.
fn render(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for line in items {
        let _ = writeln!(
            out,
            "{:>4} x {:<32} {:>10}  [{}]",
            line.quantity.get(),
            line.title,
            line.price.to_string(),
            line.id.as_str()
        );
    }
    let units: u64 = items.iter().map(|line| u64::from(line.quantity.get())).sum();
    let _ = writeln!(out, "{} products, {units} units", items.len());
    out
}
