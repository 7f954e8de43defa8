//! `shop search`.

use shopfront_storefront::search::highlight_match;
use shopfront_storefront::{StoreApi, Storefront};

/// Print suggestions for `query` with the matching part bracketed.
pub async fn suggest<A: StoreApi>(store: &mut Storefront<A>, query: &str) {
    store.search(query).await;

    let search = store.state().search();
    if !search.is_open() {
        println!("No suggestions for \"{query}\".");
        return;
    }

    for product in search.suggestions() {
        match highlight_match(&product.name, query) {
            Some(h) => println!("  {}[{}]{}", h.before, h.matched, h.after),
            None => println!("  {}", product.name),
        }
    }
}
