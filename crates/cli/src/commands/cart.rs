//! `shop cart`.

use shopfront_storefront::{StoreApi, Storefront, View};

/// Print the reconciled cart with line totals.
pub fn show<A: StoreApi>(store: &Storefront<A>) {
    let View::Store(view) = store.view() else {
        return;
    };

    let cart = view.cart;
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    println!("Cart ({} items)", cart.len());
    for line in cart.lines() {
        println!(
            "{:>4} x {:<40} {:>10} {:>10}",
            line.quantity,
            line.name,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    println!("{:>68}", format!("Total: {}", cart.total()));
}
