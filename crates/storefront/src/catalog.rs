//! Catalog loading.
//!
//! Products and categories are requested concurrently whenever the session
//! becomes authenticated. Either failure is fatal for the store view: the
//! error is kept on the state and the store is not rendered. There is no
//! retry.

use shopfront_core::{Category, Product};
use thiserror::Error;
use tracing::{debug, error};

use crate::api::{ApiError, StoreApi};

/// Fatal catalog load failure.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Error loading products")]
    Products(#[source] ApiError),

    #[error("Error loading categories")]
    Categories(#[source] ApiError),
}

/// Outcome of one catalog load: one result per request.
#[derive(Debug)]
pub struct CatalogLoad {
    pub products: Result<Vec<Product>, ApiError>,
    pub categories: Result<Vec<Category>, ApiError>,
}

/// Request products and categories concurrently.
///
/// Issues exactly one request of each kind; the two complete in any order.
pub async fn load<A: StoreApi>(api: &A) -> CatalogLoad {
    let (products, categories) = tokio::join!(api.products(), api.categories());
    CatalogLoad {
        products,
        categories,
    }
}

/// Complete a load whose products were already fetched.
///
/// Only categories are requested.
pub async fn load_with_products<A: StoreApi>(api: &A, products: Vec<Product>) -> CatalogLoad {
    CatalogLoad {
        products: Ok(products),
        categories: api.categories().await,
    }
}

/// The last loaded products and categories.
///
/// The revision increases every time the product list is replaced; cart
/// reconciliation re-runs whenever it changes.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    revision: u64,
}

impl Catalog {
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Apply a load outcome.
    ///
    /// Each successful half replaces its collection independently. If either
    /// request failed the corresponding [`LoadError`] is returned; when both
    /// failed, the products failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the fatal load error for the first failed request.
    pub fn apply(&mut self, load: CatalogLoad) -> Result<(), LoadError> {
        let CatalogLoad {
            products,
            categories,
        } = load;

        let categories_error = match categories {
            Ok(categories) => {
                debug!(count = categories.len(), "Categories loaded");
                self.categories = categories;
                None
            }
            Err(e) => {
                error!(error = %e, "Error fetching categories");
                Some(LoadError::Categories(e))
            }
        };

        match products {
            Ok(products) => {
                debug!(count = products.len(), "Products loaded");
                self.products = products;
                self.revision += 1;
            }
            Err(e) => {
                error!(error = %e, "Error fetching products");
                return Err(LoadError::Products(e));
            }
        }

        categories_error.map_or(Ok(()), Err)
    }

    /// Drop everything, e.g. on logout.
    pub fn clear(&mut self) {
        self.products.clear();
        self.categories.clear();
        self.revision += 1;
    }
}
