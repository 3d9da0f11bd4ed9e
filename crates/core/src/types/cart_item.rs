//! Cart line items.
//!
//! The serialized form of [`CartItem`] is the persisted cart format:
//!
//! ```json
//! {"id":"1","title":"Chair","image_url":"https://...","price":19.99,"quantity":2}
//! ```

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product ID, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units of this product in the cart.
    pub quantity: Quantity,
}

/// A product being added to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewCartItem {
    /// Create a new cart item descriptor.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<NewCartItem> for CartItem {
    /// A freshly added line starts with a single unit.
    fn from(item: NewCartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: Quantity::ONE,
        }
    }
}
