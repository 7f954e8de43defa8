//! Application state of the store view-model.
//!
//! All session-scoped UI state lives in one explicit struct owned by the
//! [`Storefront`](crate::store::Storefront) controller. Asynchronous results
//! enter through the `apply_*` methods together with the ticket they were
//! requested under; results for a session or query that has moved on are
//! dropped.

use shopfront_core::{Category, CategoryId, Product, ProductId, ServerCart};
use tracing::{debug, info};

use crate::api::ApiError;
use crate::cart::{self, Cart};
use crate::catalog::{Catalog, CatalogLoad, LoadError};
use crate::filter::{Filter, PageError, PageView, PagingMode};
use crate::notice::{CHECKOUT_NOTICE_TTL, CHECKOUT_SUCCESS, Notifier};
use crate::search::{Key, QueryChange, SearchBox, SearchTicket};
use crate::session::{LoginError, Session, SessionEpoch};

/// Session-scoped UI state.
#[derive(Debug, Default)]
pub struct StoreState {
    session: Session,
    catalog: Catalog,
    cart: Cart,
    cart_open: bool,
    filter: Filter,
    search: SearchBox,
    load_error: Option<LoadError>,
    login_error: Option<LoginError>,
    notifier: Notifier,
}

/// What the front-end should render.
#[derive(Debug)]
pub enum View<'a> {
    /// Not logged in: the login form, with the last login error if any.
    Login { error: Option<&'a LoginError> },
    /// A fatal catalog load error; nothing else is rendered.
    Blocked(&'a LoadError),
    /// The store.
    Store(StoreView<'a>),
}

/// Everything the store screen shows.
#[derive(Debug)]
pub struct StoreView<'a> {
    pub page: PageView<'a>,
    pub categories: &'a [Category],
    pub selected_category: Option<&'a CategoryId>,
    pub search: &'a SearchBox,
    pub cart: &'a Cart,
    pub cart_open: bool,
    pub notice: Option<&'a str>,
}

impl StoreState {
    #[must_use]
    pub fn new(paging: PagingMode) -> Self {
        Self {
            filter: Filter::new(paging),
            ..Self::default()
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub const fn search(&self) -> &SearchBox {
        &self.search
    }

    #[must_use]
    pub const fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// Hand the fatal load error to a caller that ends the session with it.
    pub const fn take_load_error(&mut self) -> Option<LoadError> {
        self.load_error.take()
    }

    #[must_use]
    pub const fn login_error(&self) -> Option<&LoginError> {
        self.login_error.as_ref()
    }

    /// The visible notification, if it has not expired.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notifier.current()
    }

    /// Derive the view to render.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        if let Some(error) = &self.load_error {
            return View::Blocked(error);
        }
        if !self.session.is_authenticated() {
            return View::Login {
                error: self.login_error.as_ref(),
            };
        }
        View::Store(StoreView {
            page: self.filter.view(self.catalog.products()),
            categories: self.catalog.categories(),
            selected_category: self.filter.category(),
            search: &self.search,
            cart: &self.cart,
            cart_open: self.cart_open,
            notice: self.notifier.current(),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mark the session authenticated. Returns `true` on a transition.
    pub fn sign_in(&mut self) -> bool {
        self.login_error = None;
        let changed = self.session.sign_in();
        if changed {
            info!("Session authenticated");
        }
        changed
    }

    /// Log out locally and drop everything loaded under the session.
    pub fn sign_out(&mut self) {
        if self.session.sign_out() {
            info!("Session ended");
        }
        let paging = self.filter.paging();
        self.catalog.clear();
        self.cart.clear();
        self.cart_open = false;
        self.filter = Filter::new(paging);
        self.search.reset();
        self.load_error = None;
        self.login_error = None;
        self.notifier.dismiss();
    }

    pub fn set_login_error(&mut self, error: LoginError) {
        self.login_error = Some(error);
    }

    pub fn clear_login_error(&mut self) {
        self.login_error = None;
    }

    // =========================================================================
    // Async results
    // =========================================================================

    /// Apply a catalog load requested under `epoch`.
    ///
    /// Returns `true` when the product list was replaced with a non-empty one,
    /// meaning the cart must be reconciled against it.
    pub fn apply_catalog(&mut self, epoch: SessionEpoch, load: CatalogLoad) -> bool {
        if !self.session.is_current(epoch) {
            debug!("Discarding catalog load from a previous session");
            return false;
        }

        let revision = self.catalog.revision();
        if let Err(e) = self.catalog.apply(load) {
            self.load_error = Some(e);
        }
        self.catalog.revision() != revision && !self.catalog.is_empty()
    }

    /// Apply a cart fetch requested under `epoch`.
    ///
    /// The server cart is joined against the catalog as it is now, and the
    /// result replaces the local cart. Returns `false` if the result was
    /// discarded as stale.
    pub fn apply_cart(
        &mut self,
        epoch: SessionEpoch,
        fetched: Result<ServerCart, ApiError>,
    ) -> bool {
        if !self.session.is_current(epoch) {
            debug!("Discarding cart from a previous session");
            return false;
        }
        let lines = cart::resolve(fetched, self.catalog.products());
        debug!(lines = lines.len(), "Cart reconciled");
        self.cart.replace(lines);
        true
    }

    /// Apply a search response.
    pub fn apply_search(&mut self, ticket: SearchTicket, outcome: Result<Vec<Product>, ApiError>) {
        if let Some(results) = self.search.apply(ticket, outcome) {
            self.filter.set_search_results(results);
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Record new search text. An empty query restores the full catalog.
    pub fn set_query(&mut self, text: &str) -> QueryChange {
        let change = self.search.set_query(text);
        if change == QueryChange::Cleared {
            self.filter.set_search_results(Vec::new());
        }
        change
    }

    /// Keyboard navigation in the suggestion dropdown.
    pub fn search_key(&mut self, key: Key) {
        if let Some(results) = self.search.key(key) {
            self.filter.set_search_results(results);
        }
    }

    /// Pick a suggestion with the pointer.
    pub fn select_suggestion(&mut self, index: usize) {
        if let Some(results) = self.search.select(index) {
            self.filter.set_search_results(results);
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn select_category(&mut self, category: Option<CategoryId>) {
        self.filter.select_category(category);
    }

    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] for pages outside the current range.
    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        self.filter.go_to_page(page, self.catalog.products())
    }

    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] on the last page.
    pub fn next_page(&mut self) -> Result<(), PageError> {
        self.filter.next_page(self.catalog.products())
    }

    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] on the first page.
    pub fn prev_page(&mut self) -> Result<(), PageError> {
        self.filter.prev_page(self.catalog.products())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add(product);
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        self.cart.remove(product_id)
    }

    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        self.cart.update_quantity(product_id, quantity)
    }

    pub fn increment(&mut self, product_id: &ProductId) -> bool {
        self.cart.increment(product_id)
    }

    pub fn decrement(&mut self, product_id: &ProductId) -> bool {
        self.cart.decrement(product_id)
    }

    pub const fn toggle_cart_panel(&mut self) {
        self.cart_open = !self.cart_open;
    }

    /// Local checkout: confirm, empty the cart and collapse the cart panel.
    ///
    /// The confirmation clears itself after three seconds; a later checkout
    /// replaces it and its deadline. Nothing is sent to the Store API.
    pub fn checkout(&mut self) {
        info!(lines = self.cart.len(), total = %self.cart.total(), "Checkout");
        self.notifier.show(CHECKOUT_SUCCESS, CHECKOUT_NOTICE_TTL);
        self.cart.clear();
        self.cart_open = false;
    }

    /// Drop the notification once its deadline has passed.
    pub fn prune_notice(&mut self) -> bool {
        self.notifier.prune()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use reqwest::StatusCode;
    use shopfront_core::{Price, ServerCartItem};

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            price: Price::from_cents(1000),
            category_id: Some(CategoryId::from(1)),
            image_url: None,
        }
    }

    fn load(count: i64) -> CatalogLoad {
        CatalogLoad {
            products: Ok((1..=count).map(product).collect()),
            categories: Ok(vec![Category {
                id: CategoryId::from(1),
                name: "All the things".to_string(),
            }]),
        }
    }

    fn server_cart(items: &[(i64, i64)]) -> ServerCart {
        ServerCart {
            items: items
                .iter()
                .map(|&(id, quantity)| ServerCartItem {
                    product_id: ProductId::from(id),
                    quantity,
                })
                .collect(),
        }
    }

    fn signed_in() -> StoreState {
        let mut state = StoreState::new(PagingMode::default());
        state.sign_in();
        state
    }

    #[test]
    fn test_view_login_until_signed_in() {
        let mut state = StoreState::new(PagingMode::default());
        assert!(matches!(state.view(), View::Login { error: None }));

        state.set_login_error(LoginError::Connection);
        assert!(matches!(
            state.view(),
            View::Login {
                error: Some(LoginError::Connection)
            }
        ));

        state.sign_in();
        assert!(state.login_error().is_none());
        assert!(matches!(state.view(), View::Store(_)));
    }

    #[test]
    fn test_catalog_failure_blocks_view() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        let reconcile = state.apply_catalog(
            epoch,
            CatalogLoad {
                products: Ok(vec![product(1)]),
                categories: Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            },
        );
        assert!(reconcile);
        assert!(matches!(state.view(), View::Blocked(LoadError::Categories(_))));

        assert!(state.take_load_error().is_some());
        assert!(matches!(state.view(), View::Store(_)));
    }

    #[test]
    fn test_catalog_load_requests_reconciliation() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        assert!(state.apply_catalog(epoch, load(3)));

        // An empty catalog does not trigger reconciliation
        assert!(!state.apply_catalog(epoch, load(0)));
    }

    #[test]
    fn test_unauthorized_cart_is_empty_and_not_fatal() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(2));
        state.add_to_cart(&product(1));

        assert!(state.apply_cart(epoch, Err(ApiError::Unauthorized)));
        assert!(state.cart().is_empty());
        assert!(state.load_error().is_none());
        assert!(matches!(state.view(), View::Store(_)));
    }

    #[test]
    fn test_reconciliation_overwrites_local_changes() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(2));
        state.add_to_cart(&product(2));

        state.apply_cart(epoch, Ok(server_cart(&[(1, 2), (9, 5)])));
        let lines = state.cart().lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, ProductId::from(1));
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_cart_joined_against_latest_catalog() {
        // The cart response lands after a catalog refresh that removed product 2
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(2));
        state.apply_catalog(epoch, load(1));

        state.apply_cart(epoch, Ok(server_cart(&[(1, 1), (2, 1)])));
        assert_eq!(state.cart().len(), 1);
    }

    #[test]
    fn test_stale_results_after_logout_are_discarded() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.sign_out();

        assert!(!state.apply_catalog(epoch, load(3)));
        assert!(!state.apply_cart(epoch, Ok(server_cart(&[(1, 1)]))));
        assert!(state.catalog().is_empty());
        assert!(state.cart().is_empty());
        assert!(matches!(state.view(), View::Login { .. }));

        // Still discarded after signing in again
        state.sign_in();
        assert!(!state.apply_catalog(epoch, load(3)));
        assert!(state.catalog().is_empty());
    }

    #[test]
    fn test_search_from_previous_session_is_discarded() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(3));
        let QueryChange::Fetch(old) = state.set_query("lamp") else {
            panic!("expected a fetch");
        };

        state.sign_out();
        state.sign_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(3));
        let QueryChange::Fetch(_) = state.set_query("chair") else {
            panic!("expected a fetch");
        };

        // The response for the old session's query arrives late
        state.apply_search(old, Ok(vec![product(1)]));
        assert!(state.filter().search_results().is_empty());
        let View::Store(view) = state.view() else {
            panic!("expected the store view");
        };
        assert!(view.search.suggestions().is_empty());
        assert_eq!(view.search.query(), "chair");
    }

    #[test]
    fn test_sign_out_resets_state() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(8));
        state.add_to_cart(&product(1));
        state.toggle_cart_panel();
        state.go_to_page(2).unwrap();

        state.sign_out();
        assert!(state.cart().is_empty());
        assert!(!state.is_cart_open());
        assert_eq!(state.filter().page(), 1);
        assert!(state.catalog().categories().is_empty());
    }

    #[test]
    fn test_search_results_drive_product_list() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(13));
        state.go_to_page(2).unwrap();

        let QueryChange::Fetch(ticket) = state.set_query("Product 1") else {
            panic!("expected a fetch");
        };
        state.apply_search(ticket, Ok(vec![product(1), product(10)]));
        assert_eq!(state.filter().page(), 1);

        let View::Store(view) = state.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.page.total_items, 2);
        assert!(view.search.is_open());

        // Selecting a suggestion narrows the list to that product
        state.search_key(Key::Down);
        state.search_key(Key::Down);
        state.search_key(Key::Enter);
        assert_eq!(state.filter().search_results(), [product(10)]);

        // Clearing the query restores the catalog
        assert_eq!(state.set_query(""), QueryChange::Cleared);
        let View::Store(view) = state.view() else {
            panic!("expected the store view");
        };
        assert_eq!(view.page.total_items, 13);
    }

    #[test]
    fn test_select_suggestion_by_pointer() {
        let mut state = signed_in();
        let QueryChange::Fetch(ticket) = state.set_query("Prod") else {
            panic!("expected a fetch");
        };
        state.apply_search(ticket, Ok(vec![product(4), product(5)]));
        state.select_suggestion(1);
        assert_eq!(state.filter().search_results(), [product(5)]);
        assert_eq!(state.search().query(), "Product 5");
    }

    #[test]
    fn test_paging_through_state() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(13));

        state.next_page().unwrap();
        state.next_page().unwrap();
        assert!(state.next_page().is_err());
        assert_eq!(state.filter().page(), 3);

        state.prev_page().unwrap();
        assert_eq!(state.filter().page(), 2);

        state.select_category(Some(CategoryId::from(1)));
        assert_eq!(state.filter().page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_resets_cart_and_notifies() {
        let mut state = signed_in();
        let epoch = state.session().epoch();
        state.apply_catalog(epoch, load(2));
        state.add_to_cart(&product(1));
        state.add_to_cart(&product(2));
        state.toggle_cart_panel();
        assert!(state.is_cart_open());

        state.checkout();
        assert!(state.cart().is_empty());
        assert!(!state.is_cart_open());
        assert_eq!(state.notice(), Some(CHECKOUT_SUCCESS));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(state.notice(), None);
        assert!(state.prune_notice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_checkout_extends_notice() {
        let mut state = signed_in();
        state.checkout();
        tokio::time::advance(Duration::from_secs(2)).await;
        state.checkout();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(state.notice(), Some(CHECKOUT_SUCCESS));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn test_cart_mutations_through_state() {
        let mut state = signed_in();
        let mug = product(1);
        state.add_to_cart(&mug);
        state.add_to_cart(&mug);
        assert!(state.increment(&mug.id));
        assert_eq!(state.cart().line(&mug.id).unwrap().quantity, 3);
        assert!(state.decrement(&mug.id));
        assert!(state.update_quantity(&mug.id, 7));
        assert_eq!(state.cart().total(), Price::from_cents(7000));
        assert!(state.remove_from_cart(&mug.id));
        assert!(!state.remove_from_cart(&mug.id));
    }
}
