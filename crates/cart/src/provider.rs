//! Scoped access to the cart.
//!
//! Screens that need the cart can either take a [`CartStore`] handle directly
//! or look it up with [`use_cart`] while running inside [`provide_cart`].
//! The scope is task-local: tasks spawned from inside it do not inherit the
//! cart and must be handed a clone.

use std::future::Future;

use crate::error::{CartError, Result};
use crate::store::CartStore;

tokio::task_local! {
    static CART: CartStore;
}

/// Run `f` with `store` available through [`use_cart`].
pub async fn provide_cart<F>(store: CartStore, f: F) -> F::Output
where
    F: Future,
{
    CART.scope(store, f).await
}

/// Get the cart provided to the current task.
///
/// # Errors
///
/// Returns [`CartError::NoProvider`] when called outside of [`provide_cart`].
pub fn use_cart() -> Result<CartStore> {
    CART.try_with(CartStore::clone)
        .map_err(|_| CartError::NoProvider)
}
