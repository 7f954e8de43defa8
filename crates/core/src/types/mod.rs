//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the catalog and cart concepts
//! exchanged with the Store API.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartLine, ServerCart, ServerCartItem};
pub use id::*;
pub use price::Price;
pub use product::{Category, Product};
