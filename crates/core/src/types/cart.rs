//! Cart types: the server-held cart and the locally displayed cart lines.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// The cart as returned by `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCart {
    #[serde(default)]
    pub items: Vec<ServerCartItem>,
}

/// A single entry in the server-held cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCartItem {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// A line in the local cart.
///
/// Carries a denormalized copy of the product fields needed for display, taken
/// from the catalog at the time the line was created or reconciled.
///
/// The quantity is signed: the cart does not clamp it, so zero and negative
/// quantities set through quantity updates stay visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
}

impl CartLine {
    /// Create a line for `product` with the given quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_cart_defaults() {
        let cart: ServerCart = serde_json::from_str("{}").unwrap();
        assert!(cart.items.is_empty());

        let cart: ServerCart =
            serde_json::from_str(r#"{"items": [{"product_id": 4}]}"#).unwrap();
        assert_eq!(cart.items[0].product_id, ProductId::from(4));
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[test]
    fn test_line_from_product() {
        let product = Product {
            id: ProductId::from(1),
            name: "Mug".to_string(),
            price: Price::from_cents(850),
            category_id: None,
            image_url: Some("/mug.png".to_string()),
        };
        let line = CartLine::from_product(&product, 3);
        assert_eq!(line.product_id, product.id);
        assert_eq!(line.name, "Mug");
        assert_eq!(line.line_total(), Price::from_cents(2550));
    }
}
