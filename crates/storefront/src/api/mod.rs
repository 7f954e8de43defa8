//! Store API client.
//!
//! # Architecture
//!
//! - The Store API is the source of truth for products, categories and the
//!   server-held cart; nothing is persisted locally
//! - [`StoreApi`] is the seam the view-model talks through, so tests can swap
//!   in an in-memory implementation
//! - [`StoreClient`] is the `reqwest` implementation; it keeps a cookie store
//!   so the session cookie set by `POST /login` rides along on every call
//!
//! # Endpoints
//!
//! | Call | Method | Path |
//! |---|---|---|
//! | Session probe / catalog | GET | `/products` |
//! | Categories | GET | `/categories` |
//! | Cart read | GET | `/cart` |
//! | Search | GET | `/search?query=<text>` |
//! | Login | POST | `/login` |
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::{StoreApi, StoreClient};
//!
//! let client = StoreClient::new(&config)?;
//! client.login("alice", &password).await?;
//! let products = client.products().await?;
//! ```

mod client;

use std::future::Future;

use reqwest::StatusCode;
use secrecy::SecretString;
use shopfront_core::{Category, Product, ServerCart};
use thiserror::Error;

use crate::session::LoginError;

pub use client::StoreClient;

/// Errors that can occur when talking to the Store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is missing or expired (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The API answered with another non-success status.
    #[error("Unexpected status {0}")]
    Status(StatusCode),

    /// The response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this error means the caller is not logged in.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Operations the view-model needs from the Store API.
pub trait StoreApi {
    /// `GET /products`. Also used as the session probe.
    fn products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `GET /categories`.
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// `GET /cart`. A 401 surfaces as [`ApiError::Unauthorized`].
    fn cart(&self) -> impl Future<Output = Result<ServerCart, ApiError>> + Send;

    /// `GET /search?query=<text>`. Callers never pass an empty query.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `POST /login`.
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), LoginError>> + Send;
}
