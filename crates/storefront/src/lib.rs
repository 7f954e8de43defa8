//! Shopfront storefront library.
//!
//! The view-model of a single-user store front-end talking to a Store API:
//! session gate, catalog load, cart reconciliation, filtering and pagination,
//! search with autocomplete, and a local checkout. Rendering is left to the
//! front-end; [`state::StoreState::view`] derives everything it needs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod notice;
pub mod search;
pub mod session;
pub mod state;
pub mod store;

pub use api::{ApiError, StoreApi, StoreClient};
pub use config::StorefrontConfig;
pub use error::AppError;
pub use state::{StoreState, StoreView, View};
pub use store::Storefront;
