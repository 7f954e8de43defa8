//! `shop categories`.

use shopfront_storefront::{StoreApi, Storefront, View};

/// Print the categories, marking the ones with products.
pub fn list<A: StoreApi>(store: &Storefront<A>) {
    let catalog = store.state().catalog();
    if let View::Store(view) = store.view() {
        for category in view.categories {
            let count = catalog
                .products()
                .iter()
                .filter(|p| p.in_category(&category.id))
                .count();
            println!("{:>6}  {} ({count})", category.id.as_str(), category.name);
        }
    }
}
