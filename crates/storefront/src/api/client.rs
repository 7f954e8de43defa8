//! `reqwest` implementation of [`StoreApi`].

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shopfront_core::{Category, Product, ServerCart};
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, StoreApi};
use crate::config::StorefrontConfig;
use crate::session::LoginError;

/// Maximum number of body characters written to logs.
const LOG_BODY_CHARS: usize = 200;

/// Client for the Store API.
///
/// Cheaply cloneable; clones share the connection pool and the cookie store,
/// so a login through one clone authenticates all of them.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    config: StorefrontConfig,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Error body of a rejected login. `detail` is a string for credential
/// failures and a list for request validation failures.
#[derive(Deserialize)]
struct LoginFailure {
    detail: Option<serde_json::Value>,
}

impl StoreClient {
    /// Create a new Store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StoreClientInner {
                client,
                config: config.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.config.api_url
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.config.endpoint(path)?;
        Ok(self.inner.client.get(url))
    }

    /// Send a request and decode a JSON success body.
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("Store API rejected the session");
            return Err(ApiError::Unauthorized);
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Store API returned non-success status"
            );
            return Err(ApiError::Status(status));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Failed to parse Store API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl StoreApi for StoreClient {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        Self::send_json(self.get("/products")?).await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        Self::send_json(self.get("/categories")?).await
    }

    #[instrument(skip(self))]
    async fn cart(&self) -> Result<ServerCart, ApiError> {
        Self::send_json(self.get("/cart")?).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let request = self.get("/search")?.query(&[("query", query)]);
        Self::send_json(request).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), LoginError> {
        let url = self.inner.config.endpoint("/login").map_err(|e| {
            tracing::error!(error = %e, "Invalid login URL");
            LoginError::Connection
        })?;

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response = match self.inner.client.post(url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Login request failed");
                return Err(LoginError::Connection);
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Login accepted");
            return Ok(());
        }

        // A rejection without a JSON body is reported like a transport failure
        let failure = match response.json::<LoginFailure>().await {
            Ok(failure) => failure,
            Err(e) => {
                tracing::error!(status = %status, error = %e, "Unreadable login response");
                return Err(LoginError::Connection);
            }
        };
        let detail = failure.detail.and_then(|detail| match detail {
            serde_json::Value::String(message) => Some(message),
            _ => None,
        });
        debug!(status = %status, ?detail, "Login rejected");

        Err(LoginError::rejected(detail))
    }
}
