//! Shopfront Core - Shared types library.
//!
//! This crate provides the catalog and cart types used by every Shopfront
//! component:
//! - `storefront` - Store view-model and Store API client
//! - `cli` - Terminal front-end driving the view-model
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Normalized identifiers, prices, products, categories and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
