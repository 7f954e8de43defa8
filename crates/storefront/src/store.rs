//! Storefront controller.
//!
//! Drives the [`StoreState`] against a [`StoreApi`]: session probe, login,
//! catalog load, cart reconciliation and search. Local interactions (cart
//! edits, filters, paging, checkout) go straight to the state.

use secrecy::SecretString;
use shopfront_core::Product;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, StoreApi};
use crate::catalog;
use crate::config::StorefrontConfig;
use crate::search::QueryChange;
use crate::session::LoginError;
use crate::state::{StoreState, View};

/// The store view-model bound to a Store API.
#[derive(Debug)]
pub struct Storefront<A> {
    api: A,
    state: StoreState,
}

impl<A: StoreApi> Storefront<A> {
    #[must_use]
    pub fn new(api: A, config: &StorefrontConfig) -> Self {
        Self {
            api,
            state: StoreState::new(config.paging),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    /// Mutable access for local interactions.
    pub const fn state_mut(&mut self) -> &mut StoreState {
        &mut self.state
    }

    #[must_use]
    pub fn view(&self) -> View<'_> {
        self.state.view()
    }

    /// Check for an existing session on startup.
    ///
    /// A successful `GET /products` means the session cookie is valid; the
    /// store is then loaded from those products. Any failure leaves the user
    /// logged out.
    #[instrument(skip(self))]
    pub async fn probe_session(&mut self) -> bool {
        match self.api.products().await {
            Ok(products) => {
                self.state.sign_in();
                self.load(Some(products)).await;
                true
            }
            Err(ApiError::Unauthorized) => {
                debug!("No existing session");
                false
            }
            Err(e) => {
                warn!(error = %e, "Session probe failed");
                false
            }
        }
    }

    /// Log in and load the store.
    ///
    /// On failure the error is kept on the state for the login form and
    /// also returned.
    ///
    /// # Errors
    ///
    /// Returns the [`LoginError`] shown to the user.
    #[instrument(skip(self, password))]
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), LoginError> {
        self.state.clear_login_error();
        if let Err(e) = self.api.login(username, password).await {
            warn!(error = %e, "Login failed");
            self.state.set_login_error(e.clone());
            return Err(e);
        }

        info!("Logged in");
        self.state.sign_in();
        self.refresh().await;
        Ok(())
    }

    /// Log out locally. No request is sent.
    pub fn logout(&mut self) {
        self.state.sign_out();
    }

    /// Load products and categories, then reconcile the cart.
    ///
    /// Does nothing while logged out. A load failure is kept on the state and
    /// blocks the store view.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) {
        self.load(None).await;
    }

    async fn load(&mut self, products: Option<Vec<Product>>) {
        if !self.state.session().is_authenticated() {
            debug!("Skipping catalog load while logged out");
            return;
        }

        let epoch = self.state.session().epoch();
        let load = match products {
            Some(products) => catalog::load_with_products(&self.api, products).await,
            None => catalog::load(&self.api).await,
        };
        if self.state.apply_catalog(epoch, load) {
            self.reconcile_cart().await;
        }
    }

    /// Replace the local cart with the server cart joined against the
    /// catalog. Skipped while logged out or before any product is loaded.
    #[instrument(skip(self))]
    pub async fn reconcile_cart(&mut self) {
        if !self.state.session().is_authenticated() || self.state.catalog().is_empty() {
            debug!("Skipping cart reconciliation");
            return;
        }

        let epoch = self.state.session().epoch();
        let fetched = self.api.cart().await;
        self.state.apply_cart(epoch, fetched);
    }

    /// Update the search text and fetch suggestions for it.
    #[instrument(skip(self))]
    pub async fn search(&mut self, text: &str) {
        if let QueryChange::Fetch(ticket) = self.state.set_query(text) {
            let outcome = self.api.search(text).await;
            self.state.apply_search(ticket, outcome);
        }
    }

    /// Local checkout.
    pub fn checkout(&mut self) {
        self.state.checkout();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::catalog::LoadError;
    use crate::notice::CHECKOUT_SUCCESS;
    use reqwest::StatusCode;
    use secrecy::ExposeSecret;
    use shopfront_core::{Category, CategoryId, Price, ProductId, ServerCart, ServerCartItem};

    /// How a fake endpoint answers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Reply {
        Ok,
        Unauthorized,
        Fail,
    }

    impl Reply {
        fn into_result<T>(self, value: T) -> Result<T, ApiError> {
            match self {
                Self::Ok => Ok(value),
                Self::Unauthorized => Err(ApiError::Unauthorized),
                Self::Fail => Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            }
        }
    }

    #[derive(Debug)]
    struct FakeState {
        logged_in: bool,
        products: Vec<Product>,
        cart: Vec<ServerCartItem>,
        products_reply: Reply,
        categories_reply: Reply,
        cart_reply: Reply,
    }

    /// In-memory Store API with a single valid account.
    #[derive(Debug, Clone)]
    struct FakeApi {
        state: Arc<Mutex<FakeState>>,
        products_calls: Arc<AtomicUsize>,
        cart_calls: Arc<AtomicUsize>,
    }

    impl FakeApi {
        fn new(products: Vec<Product>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    logged_in: false,
                    products,
                    cart: Vec::new(),
                    products_reply: Reply::Ok,
                    categories_reply: Reply::Ok,
                    cart_reply: Reply::Ok,
                })),
                products_calls: Arc::new(AtomicUsize::new(0)),
                cart_calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with(&self, f: impl FnOnce(&mut FakeState)) {
            f(&mut self.state.lock().unwrap());
        }

        fn products_calls(&self) -> usize {
            self.products_calls.load(Ordering::SeqCst)
        }

        fn cart_calls(&self) -> usize {
            self.cart_calls.load(Ordering::SeqCst)
        }

        fn gate(&self, reply: Reply) -> Reply {
            if reply == Reply::Ok && !self.state.lock().unwrap().logged_in {
                Reply::Unauthorized
            } else {
                reply
            }
        }
    }

    impl StoreApi for FakeApi {
        async fn products(&self) -> Result<Vec<Product>, ApiError> {
            self.products_calls.fetch_add(1, Ordering::SeqCst);
            let (reply, products) = {
                let state = self.state.lock().unwrap();
                (state.products_reply, state.products.clone())
            };
            self.gate(reply).into_result(products)
        }

        async fn categories(&self) -> Result<Vec<Category>, ApiError> {
            let reply = self.state.lock().unwrap().categories_reply;
            self.gate(reply).into_result(vec![Category {
                id: CategoryId::from(1),
                name: "Lighting".to_string(),
            }])
        }

        async fn cart(&self) -> Result<ServerCart, ApiError> {
            self.cart_calls.fetch_add(1, Ordering::SeqCst);
            let (reply, items) = {
                let state = self.state.lock().unwrap();
                (state.cart_reply, state.cart.clone())
            };
            self.gate(reply).into_result(ServerCart { items })
        }

        async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
            let needle = query.to_lowercase();
            let matches = self
                .state
                .lock()
                .unwrap()
                .products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            self.gate(Reply::Ok).into_result(matches)
        }

        async fn login(&self, username: &str, password: &SecretString) -> Result<(), LoginError> {
            if username == "alice" && password.expose_secret() == "hunter2" {
                self.state.lock().unwrap().logged_in = true;
                Ok(())
            } else {
                Err(LoginError::rejected(Some("Invalid credentials".to_string())))
            }
        }
    }

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            price: Price::from_cents(2500),
            category_id: Some(CategoryId::from(1)),
            image_url: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Desk Lamp"),
            product(2, "Floor Lamp"),
            product(3, "Pendant"),
        ]
    }

    fn storefront(api: &FakeApi) -> Storefront<FakeApi> {
        Storefront::new(api.clone(), &StorefrontConfig::default())
    }

    fn password(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn test_probe_without_session_shows_login() {
        let api = FakeApi::new(catalog());
        let mut store = storefront(&api);
        assert!(!store.probe_session().await);
        assert!(matches!(store.view(), View::Login { error: None }));
    }

    #[tokio::test]
    async fn test_probe_with_session_loads_store() {
        let api = FakeApi::new(catalog());
        api.with(|s| {
            s.logged_in = true;
            s.cart = vec![ServerCartItem {
                product_id: ProductId::from(2),
                quantity: 3,
            }];
        });
        let mut store = storefront(&api);

        assert!(store.probe_session().await);
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.page.total_items, 3);
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.cart.len(), 1);
        assert_eq!(view.cart.lines()[0].name, "Floor Lamp");

        // The products that confirmed the session are reused
        assert_eq!(api.products_calls(), 1);
        assert_eq!(api.cart_calls(), 1);
    }

    #[tokio::test]
    async fn test_login_rejected_shows_detail() {
        let api = FakeApi::new(catalog());
        let mut store = storefront(&api);

        let err = store.login("alice", &password("wrong")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        let View::Login { error: Some(shown) } = store.view() else {
            panic!("expected a login error");
        };
        assert_eq!(shown, &err);

        // A successful retry clears the error
        store.login("alice", &password("hunter2")).await.unwrap();
        assert!(store.state().login_error().is_none());
        assert!(matches!(store.view(), View::Store(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_cart_does_not_block_store() {
        let api = FakeApi::new(catalog());
        api.with(|s| s.cart_reply = Reply::Unauthorized);
        let mut store = storefront(&api);

        store.login("alice", &password("hunter2")).await.unwrap();
        assert_eq!(api.cart_calls(), 1);
        assert!(store.state().cart().is_empty());
        assert!(matches!(store.view(), View::Store(_)));
    }

    #[tokio::test]
    async fn test_products_failure_blocks_store() {
        let api = FakeApi::new(catalog());
        api.with(|s| s.products_reply = Reply::Fail);
        let mut store = storefront(&api);

        store.login("alice", &password("hunter2")).await.unwrap();
        let View::Blocked(error) = store.view() else {
            panic!("expected a blocked view");
        };
        assert!(matches!(error, LoadError::Products(_)));
        assert_eq!(error.to_string(), "Error loading products");
        // No products, so no cart request either
        assert_eq!(api.cart_calls(), 0);
    }

    #[tokio::test]
    async fn test_categories_failure_blocks_store() {
        let api = FakeApi::new(catalog());
        api.with(|s| s.categories_reply = Reply::Fail);
        let mut store = storefront(&api);

        store.login("alice", &password("hunter2")).await.unwrap();
        assert!(matches!(
            store.view(),
            View::Blocked(LoadError::Categories(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_catalog_skips_cart() {
        let api = FakeApi::new(Vec::new());
        let mut store = storefront(&api);

        store.login("alice", &password("hunter2")).await.unwrap();
        assert_eq!(api.cart_calls(), 0);
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert!(!view.page.show_controls());
    }

    #[tokio::test]
    async fn test_logout_clears_and_refresh_is_gated() {
        let api = FakeApi::new(catalog());
        let mut store = storefront(&api);
        store.login("alice", &password("hunter2")).await.unwrap();
        store.state_mut().add_to_cart(&product(1, "Desk Lamp"));

        store.logout();
        assert!(store.state().cart().is_empty());
        assert!(store.state().catalog().is_empty());
        assert!(matches!(store.view(), View::Login { error: None }));

        store.refresh().await;
        store.reconcile_cart().await;
        assert!(store.state().catalog().is_empty());
        assert_eq!(api.cart_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_filters_product_list() {
        let api = FakeApi::new(catalog());
        let mut store = storefront(&api);
        store.login("alice", &password("hunter2")).await.unwrap();

        store.search("lamp").await;
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.search.suggestions().len(), 2);
        assert_eq!(view.page.total_items, 2);

        store.search("").await;
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert!(!view.search.is_open());
        assert_eq!(view.page.total_items, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_notice_expires() {
        let api = FakeApi::new(catalog());
        let mut store = storefront(&api);
        store.login("alice", &password("hunter2")).await.unwrap();
        store.state_mut().add_to_cart(&product(3, "Pendant"));

        store.checkout();
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.notice, Some(CHECKOUT_SUCCESS));
        assert!(view.cart.is_empty());

        tokio::time::advance(Duration::from_secs(3)).await;
        let View::Store(view) = store.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.notice, None);
    }
}
