//! Local cart and reconciliation against the server-held cart.
//!
//! Mutations are synchronous and local; nothing is written back to the Store
//! API. Reconciliation is a read-through: the server cart is joined against
//! the current catalog and the result replaces the local cart wholesale.

use std::collections::HashMap;

use shopfront_core::{CartLine, Price, Product, ProductId, ServerCart, ServerCartItem};
use tracing::{debug, warn};

use crate::api::ApiError;

/// The local cart, keyed by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines (the cart badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product, or appends a new line
    /// with quantity 1. Never creates two lines for the same product.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine::from_product(product, 1));
        }
    }

    /// Remove the line for `product_id`. Returns `false` if there was none.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set the quantity of the line for `product_id`.
    ///
    /// No lower bound is enforced: zero and negative quantities are stored as
    /// given and the line stays in the cart. Returns `false` if there is no
    /// line for the product.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        self.line_mut(product_id).is_some_and(|line| {
            line.quantity = quantity;
            true
        })
    }

    /// The `+` control: quantity plus one.
    pub fn increment(&mut self, product_id: &ProductId) -> bool {
        self.step(product_id, 1)
    }

    /// The `-` control: quantity minus one, without clamping.
    pub fn decrement(&mut self, product_id: &ProductId) -> bool {
        self.step(product_id, -1)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Replace the cart contents wholesale.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    fn step(&mut self, product_id: &ProductId, delta: i64) -> bool {
        match self.line(product_id).map(|line| line.quantity) {
            Some(quantity) => self.update_quantity(product_id, quantity.saturating_add(delta)),
            None => false,
        }
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

/// Join server cart entries against the catalog.
///
/// Each entry whose product is in the catalog becomes a line carrying the
/// server quantity and the catalog's current display fields. Entries for
/// products missing from the catalog are dropped. The result depends only on
/// the inputs, so running it again against the same cart and catalog yields
/// the same lines.
#[must_use]
pub fn reconcile(items: &[ServerCartItem], catalog: &[Product]) -> Vec<CartLine> {
    let by_id: HashMap<&ProductId, &Product> =
        catalog.iter().map(|product| (&product.id, product)).collect();

    items
        .iter()
        .filter_map(|item| match by_id.get(&item.product_id) {
            Some(product) => Some(CartLine::from_product(product, item.quantity)),
            None => {
                debug!(product_id = %item.product_id, "Dropping cart entry not in catalog");
                None
            }
        })
        .collect()
}

/// Turn the outcome of `GET /cart` into the lines the local cart should hold.
///
/// Cart failures never block browsing: an unauthenticated response resolves
/// to an empty cart silently, any other failure resolves to an empty cart and
/// is logged.
#[must_use]
pub fn resolve(fetched: Result<ServerCart, ApiError>, catalog: &[Product]) -> Vec<CartLine> {
    match fetched {
        Ok(server_cart) => reconcile(&server_cart.items, catalog),
        Err(ApiError::Unauthorized) => {
            debug!("No session for cart, starting empty");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load cart, starting empty");
            Vec::new()
        }
    }
}
