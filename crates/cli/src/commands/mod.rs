//! CLI subcommands.
//!
//! Every command starts from [`connect`], which restores or creates the
//! session and loads the store, then prints a part of the derived view.

pub mod cart;
pub mod categories;
pub mod products;
pub mod search;

use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::filter::PagingMode;
use shopfront_storefront::{StoreClient, Storefront, StorefrontConfig};
use tracing::info;

/// Flags that adjust how the store is reached.
#[derive(Debug, Default)]
pub struct ConnectOptions {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub all: bool,
}

/// Build the client, authenticate and load the store.
///
/// The session probe runs first; the configured credentials are only used
/// when there is no valid session.
///
/// # Errors
///
/// Fails on invalid configuration, a rejected login, missing credentials or a
/// fatal catalog load error.
pub async fn connect(options: ConnectOptions) -> Result<Storefront<StoreClient>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(api_url) = options.api_url.as_deref() {
        config = config.with_api_url(api_url)?;
    }
    if let Some(username) = options.username {
        config = config.with_username(username)?;
    }
    if options.all {
        config.paging = PagingMode::All;
    }

    let client = StoreClient::new(&config)?;
    info!(api_url = %client.base_url(), "Connecting to Store API");
    let mut store = Storefront::new(client, &config);

    if !store.probe_session().await {
        let credentials = config.credentials.as_ref().ok_or(AppError::NotLoggedIn)?;
        store
            .login(&credentials.username, &credentials.password)
            .await?;
    }

    if let Some(error) = store.state_mut().take_load_error() {
        return Err(error.into());
    }
    Ok(store)
}
