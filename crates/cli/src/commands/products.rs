//! `shop products`.

use shopfront_core::CategoryId;
use shopfront_storefront::error::Result;
use shopfront_storefront::filter::{PageMarker, PageView};
use shopfront_storefront::{StoreApi, Storefront, View};

/// Print one page of the filtered product list.
///
/// # Errors
///
/// Returns an error if `page` is outside the filtered list.
pub async fn list<A: StoreApi>(
    store: &mut Storefront<A>,
    category: Option<CategoryId>,
    search: Option<&str>,
    page: usize,
) -> Result<()> {
    if let Some(text) = search {
        store.search(text).await;
    }
    store.state_mut().select_category(category);
    store.state_mut().go_to_page(page)?;

    if let View::Store(view) = store.view() {
        print_page(&view.page);
    }
    Ok(())
}

fn print_page(page: &PageView<'_>) {
    if page.total_items == 0 {
        println!("No products found.");
        return;
    }

    for product in &page.products {
        println!(
            "{:>6}  {:<40} {:>10}",
            product.id.as_str(),
            product.name,
            product.price.to_string()
        );
    }

    if page.show_controls() {
        let markers: Vec<String> = page
            .markers()
            .into_iter()
            .map(|marker| match marker {
                PageMarker::Page(n) if n == page.page => format!("[{n}]"),
                PageMarker::Page(n) => n.to_string(),
                PageMarker::Ellipsis => "...".to_string(),
            })
            .collect();
        println!();
        println!(
            "{} {} {}   ({} products)",
            if page.has_prev() { "<" } else { " " },
            markers.join(" "),
            if page.has_next() { ">" } else { " " },
            page.total_items
        );
    }
}
