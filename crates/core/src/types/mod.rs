//! Core types for GoMarketplace.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod cart_item;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart_item::{CartItem, NewCartItem};
pub use id::{ProductId, ProductIdError};
pub use price::Price;
pub use quantity::{Quantity, QuantityError};
