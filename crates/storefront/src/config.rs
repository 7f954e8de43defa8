//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_API_URL` - Base URL of the Store API (default: `http://localhost:8000`)
//! - `SHOPFRONT_PAGE_SIZE` - Products per page, `0` disables pagination (default: 6)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPFRONT_USERNAME` - Login username used by the CLI
//! - `SHOPFRONT_PASSWORD` - Login password used by the CLI

use std::num::NonZeroUsize;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::filter::PagingMode;

/// Default Store API location.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 6;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the Store API
    pub api_url: Url,
    /// How the filtered product list is split into pages
    pub paging: PagingMode,
    /// Timeout applied to every Store API request
    pub request_timeout: Duration,
    /// Login credentials, if configured
    pub credentials: Option<Credentials>,
}

/// Username and password for `POST /login`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            paging: PagingMode::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL))?;
        let page_size = get_env_or_default("SHOPFRONT_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_PAGE_SIZE".to_string(), e.to_string())
            })?;
        let timeout_secs = get_env_or_default(
            "SHOPFRONT_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar(
                "SHOPFRONT_REQUEST_TIMEOUT_SECS".to_string(),
                e.to_string(),
            )
        })?;

        let credentials = match get_optional_env("SHOPFRONT_USERNAME") {
            Some(username) => Some(Credentials {
                username,
                password: get_required_secret("SHOPFRONT_PASSWORD")?,
            }),
            None => None,
        };

        Ok(Self {
            api_url,
            paging: PagingMode::from_page_size(page_size),
            request_timeout: Duration::from_secs(timeout_secs),
            credentials,
        })
    }

    /// Point the client at another Store API.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `raw` is not a valid URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(raw)?;
        Ok(self)
    }

    /// Log in as `username`, keeping a configured password or reading
    /// `SHOPFRONT_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no password is available.
    pub fn with_username(mut self, username: String) -> Result<Self, ConfigError> {
        let password = match self.credentials.take() {
            Some(credentials) => credentials.password,
            None => get_required_secret("SHOPFRONT_PASSWORD")?,
        };
        self.credentials = Some(Credentials { username, password });
        Ok(self)
    }

    /// Resolve an API path (e.g. `/products`) against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.api_url.join(path.trim_start_matches('/'))
    }
}

impl PagingMode {
    /// Paging mode for a configured page size; `0` means unpaginated.
    #[must_use]
    pub fn from_page_size(size: usize) -> Self {
        NonZeroUsize::new(size).map_or(Self::All, Self::Paged)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, ensuring it ends with a slash so paths join beneath it.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[allow(clippy::expect_used)]
fn default_api_url() -> Url {
    parse_api_url(DEFAULT_API_URL).expect("default API URL is valid")
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(key)
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
