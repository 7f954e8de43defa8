//! Top-level error type.
//!
//! Front-ends (the `shop` CLI, tests) work with `AppError`; the individual
//! modules keep their own narrower errors, which convert into it with `?`.

use thiserror::Error;

use crate::api::ApiError;
use crate::catalog::LoadError;
use crate::config::ConfigError;
use crate::filter::PageError;
use crate::session::LoginError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store API client failure outside of a view-model operation.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Products or categories could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Login was rejected or could not be attempted.
    #[error("{0}")]
    Login(#[from] LoginError),

    /// Requested page does not exist.
    #[error("{0}")]
    Page(#[from] PageError),

    /// Login is required and no credentials are configured.
    #[error("Not logged in and no credentials configured")]
    NotLoggedIn,
}

/// Result type alias using `AppError`.
pub type Result<T, E = AppError> = std::result::Result<T, E>;
