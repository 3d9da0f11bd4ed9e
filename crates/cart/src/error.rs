//! Cart error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the cart.
///
/// Everyday mutations never return these; persistence failures during
/// `add_to_cart`, `increment`, and `decrement` are logged and recorded on the
/// store instead.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested outside of a [`provide_cart`](crate::provide_cart) scope.
    #[error("use_cart must be called within a cart provider scope")]
    NoProvider,

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
