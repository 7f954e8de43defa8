//! Integration test support for Shopfront.
//!
//! Provides [`FakeStore`], an in-process Store API served by `axum` on an
//! ephemeral port. Tests point the real `reqwest` client at it, so the cookie
//! store, status mapping and JSON decoding are exercised end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Fake API behavior
//!
//! - `POST /login` accepts `alice` / `hunter2` and sets a `session_id` cookie;
//!   other credentials get `401 {"detail": "Invalid credentials"}` and an
//!   empty field gets a `422` whose `detail` is a list
//! - every other route answers `401` without that cookie
//! - fixtures are raw JSON, so tests control the wire shape (numeric or
//!   string ids, `_id` keys, missing fields)
//! - any route can be made to fail with a chosen status, with or without a
//!   JSON body

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use shopfront_storefront::StorefrontConfig;
use tokio::net::TcpListener;

/// The only account the fake API accepts.
pub const USERNAME: &str = "alice";
/// Password for [`USERNAME`].
pub const PASSWORD: &str = "hunter2";

const SESSION_COOKIE: &str = "session_id";
const SESSION_TOKEN: &str = "fake-session-token";

/// Routes of the fake Store API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Products,
    Categories,
    Cart,
    Search,
    Login,
}

/// Mutable state behind the fake API.
#[derive(Debug, Default)]
pub struct FakeState {
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub cart: Vec<Value>,
    pub failures: HashMap<Route, StatusCode>,
    pub bare_failures: HashMap<Route, StatusCode>,
    pub hits: HashMap<Route, usize>,
    pub search_queries: Vec<String>,
}

type Shared = Arc<Mutex<FakeState>>;

/// A running fake Store API.
#[derive(Debug, Clone)]
pub struct FakeStore {
    addr: SocketAddr,
    state: Shared,
}

impl FakeStore {
    /// Serve `state` on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn spawn(state: FakeState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/products", get(products))
            .route("/categories", get(categories))
            .route("/cart", get(cart))
            .route("/search", get(search))
            .route("/login", post(login))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Store API");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Serve the default fixture.
    pub async fn spawn_default() -> Self {
        Self::spawn(fixture()).await
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server address does not form a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::default()
            .with_api_url(&self.base_url())
            .expect("Fake Store API URL is valid")
    }

    /// Make `route` answer with `status` until [`recover`](Self::recover).
    pub fn fail(&self, route: Route, status: StatusCode) {
        self.lock().failures.insert(route, status);
    }

    /// Like [`fail`](Self::fail), but the response has no body.
    pub fn fail_without_body(&self, route: Route, status: StatusCode) {
        self.lock().bare_failures.insert(route, status);
    }

    pub fn recover(&self, route: Route) {
        let mut state = self.lock();
        state.failures.remove(&route);
        state.bare_failures.remove(&route);
    }

    /// Number of requests `route` has served.
    #[must_use]
    pub fn hits(&self, route: Route) -> usize {
        self.lock().hits.get(&route).copied().unwrap_or_default()
    }

    /// Decoded `query` parameters received by `/search`, in order.
    #[must_use]
    pub fn search_queries(&self) -> Vec<String> {
        self.lock().search_queries.clone()
    }

    /// Edit the fixtures in place.
    pub fn with(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.lock());
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A small catalog with mixed id encodings.
///
/// Products use numeric ids, one of them under `_id`; the cart references
/// products by string id and includes an entry for a product that no longer
/// exists.
#[must_use]
pub fn fixture() -> FakeState {
    FakeState {
        products: vec![
            json!({"id": 1, "name": "Desk Lamp", "price": "39.90", "category_id": 1,
                   "image_url": "https://cdn.example.com/desk-lamp.jpg"}),
            json!({"_id": 2, "name": "Floor Lamp", "price": 129, "category_id": 1}),
            json!({"id": 3, "name": "Oak Chair", "price": "85.00", "category_id": "2"}),
            json!({"id": 4, "name": "Pendant Light", "price": 54.5, "category_id": 1}),
        ],
        categories: vec![
            json!({"id": 1, "name": "Lighting"}),
            json!({"id": "2", "name": "Furniture"}),
        ],
        cart: vec![
            json!({"product_id": "1", "quantity": 2}),
            json!({"product_id": 3}),
            json!({"product_id": 99, "quantity": 5}),
        ],
        ..FakeState::default()
    }
}

/// `count` products named `Product N`, all in category 1.
#[must_use]
pub fn numbered_products(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|n| {
            json!({
                "id": n,
                "name": format!("Product {n}"),
                "price": "10.00",
                "category_id": 1
            })
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == SESSION_COOKIE && value == SESSION_TOKEN)
}

/// Record the hit and decide whether the route answers normally.
fn gate(state: &Shared, route: Route, headers: &HeaderMap) -> Result<(), Response> {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    *state.hits.entry(route).or_default() += 1;

    if let Some(status) = state.bare_failures.get(&route) {
        return Err((*status).into_response());
    }
    if let Some(status) = state.failures.get(&route) {
        return Err((*status, Json(json!({"detail": "Injected failure"}))).into_response());
    }
    if route != Route::Login && !has_session(headers) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        )
            .into_response());
    }
    Ok(())
}

fn snapshot<T>(state: &Shared, f: impl FnOnce(&FakeState) -> T) -> T {
    f(&state.lock().unwrap_or_else(PoisonError::into_inner))
}

async fn products(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = gate(&state, Route::Products, &headers) {
        return response;
    }
    Json(snapshot(&state, |s| s.products.clone())).into_response()
}

async fn categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = gate(&state, Route::Categories, &headers) {
        return response;
    }
    Json(snapshot(&state, |s| s.categories.clone())).into_response()
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = gate(&state, Route::Cart, &headers) {
        return response;
    }
    Json(json!({"items": snapshot(&state, |s| s.cart.clone())})).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    if let Err(response) = gate(&state, Route::Search, &headers) {
        return response;
    }

    let needle = params.query.to_lowercase();
    let matches: Vec<Value> = snapshot(&state, |s| {
        s.products
            .iter()
            .filter(|p| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    });
    state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .search_queries
        .push(params.query);
    Json(matches).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    username: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Response {
    if let Err(response) = gate(&state, Route::Login, &headers) {
        return response;
    }

    let username = body.username.as_deref().filter(|u| !u.is_empty());
    let password = body.password.as_deref().filter(|p| !p.is_empty());
    match (username, password) {
        (Some(USERNAME), Some(PASSWORD)) => {
            let cookie = format!("{SESSION_COOKIE}={SESSION_TOKEN}; Path=/; HttpOnly");
            let mut response = Json(json!({"message": "Login successful"})).into_response();
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            response
        }
        (Some(_), Some(_)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response(),
        // Request validation failures carry a list, not a message
        _ => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "username"], "msg": "field required"}]})),
        )
            .into_response(),
    }
}
