//! Catalog types owned by the Store API.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product as returned by `GET /products` and `GET /search`.
///
/// Relational listings use `id`, while search results come from a document
/// store and may use `_id`; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Whether this product belongs to the given category.
    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category_id.as_ref() == Some(category)
    }
}

/// A product category as returned by `GET /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
