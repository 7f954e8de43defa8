//! Filter and pagination view.
//!
//! A pure derivation recomputed on every render from the active search
//! results, the selected category, the current page and the paging mode.
//! A non-empty search result set replaces the full catalog as the filter
//! input; an empty one falls back to the catalog.

use std::num::NonZeroUsize;

use shopfront_core::{CategoryId, Product};
use thiserror::Error;

use crate::config::DEFAULT_PAGE_SIZE;

/// How the filtered list is split into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// Fixed number of products per page.
    Paged(NonZeroUsize),
    /// The whole filtered list on a single page.
    All,
}

impl Default for PagingMode {
    fn default() -> Self {
        Self::from_page_size(DEFAULT_PAGE_SIZE)
    }
}

/// Page navigation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is out of range (1..={total_pages})")]
    OutOfRange { requested: usize, total_pages: usize },
}

/// A page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Active filters and current page.
#[derive(Debug, Clone)]
pub struct Filter {
    category: Option<CategoryId>,
    search_results: Vec<Product>,
    page: usize,
    paging: PagingMode,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(PagingMode::default())
    }
}

impl Filter {
    #[must_use]
    pub const fn new(paging: PagingMode) -> Self {
        Self {
            category: None,
            search_results: Vec::new(),
            page: 1,
            paging,
        }
    }

    #[must_use]
    pub const fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn search_results(&self) -> &[Product] {
        &self.search_results
    }

    /// Current page, 1-based.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn paging(&self) -> PagingMode {
        self.paging
    }

    /// Select a category (`None` for all). Resets to the first page.
    pub fn select_category(&mut self, category: Option<CategoryId>) {
        self.category = category;
        self.page = 1;
    }

    /// Select a category from raw selector input, where empty means all.
    pub fn select_category_input(&mut self, raw: &str) {
        self.select_category(CategoryId::parse(raw).ok());
    }

    /// Replace the active search results. Resets to the first page.
    pub fn set_search_results(&mut self, results: Vec<Product>) {
        self.search_results = results;
        self.page = 1;
    }

    /// Products after the search and category filters, before pagination.
    #[must_use]
    pub fn filtered<'a>(&'a self, catalog: &'a [Product]) -> Vec<&'a Product> {
        let source: &[Product] = if self.search_results.is_empty() {
            catalog
        } else {
            &self.search_results
        };

        source
            .iter()
            .filter(|product| {
                self.category
                    .as_ref()
                    .is_none_or(|category| product.in_category(category))
            })
            .collect()
    }

    /// Number of pages for the current filters; at least 1.
    #[must_use]
    pub fn total_pages(&self, catalog: &[Product]) -> usize {
        total_pages(self.filtered(catalog).len(), self.paging)
    }

    /// Jump to `page`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] for pages below 1 or past the last
    /// page; the current page is left unchanged.
    pub fn go_to_page(&mut self, page: usize, catalog: &[Product]) -> Result<(), PageError> {
        let total_pages = self.total_pages(catalog);
        if page < 1 || page > total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.page = page;
        Ok(())
    }

    /// Advance one page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] on the last page.
    pub fn next_page(&mut self, catalog: &[Product]) -> Result<(), PageError> {
        self.go_to_page(self.page.saturating_add(1), catalog)
    }

    /// Go back one page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] on the first page.
    pub fn prev_page(&mut self, catalog: &[Product]) -> Result<(), PageError> {
        self.go_to_page(self.page.saturating_sub(1), catalog)
    }

    /// Derive the visible page.
    ///
    /// If the catalog shrank since the page was chosen, the page is clamped to
    /// the last one.
    #[must_use]
    pub fn view<'a>(&'a self, catalog: &'a [Product]) -> PageView<'a> {
        let filtered = self.filtered(catalog);
        let total_items = filtered.len();
        let total_pages = total_pages(total_items, self.paging);
        let page = self.page.clamp(1, total_pages);

        let products = match self.paging {
            PagingMode::Paged(size) => filtered
                .into_iter()
                .skip((page - 1) * size.get())
                .take(size.get())
                .collect(),
            PagingMode::All => filtered,
        };

        PageView {
            products,
            page,
            total_pages,
            total_items,
        }
    }
}

/// `ceil(items / size)`, with a minimum of one page.
#[must_use]
pub fn total_pages(items: usize, paging: PagingMode) -> usize {
    match paging {
        PagingMode::Paged(size) => items.div_ceil(size.get()).max(1),
        PagingMode::All => 1,
    }
}

/// Page-number controls: first, last, and pages within distance 1 of the
/// current page, with one ellipsis marker per gap.
#[must_use]
pub fn page_markers(current: usize, total_pages: usize) -> Vec<PageMarker> {
    let mut markers = Vec::new();
    let mut last_shown = 0;

    for page in 1..=total_pages {
        if page == 1 || page == total_pages || page.abs_diff(current) <= 1 {
            if last_shown != 0 && page > last_shown + 1 {
                markers.push(PageMarker::Ellipsis);
            }
            markers.push(PageMarker::Page(page));
            last_shown = page;
        }
    }

    markers
}

/// One rendered page of the filtered product list.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub products: Vec<&'a Product>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl PageView<'_> {
    /// Whether the previous-page control is enabled.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether the next-page control is enabled.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Pagination controls are hidden for an empty list or a single page.
    #[must_use]
    pub const fn show_controls(&self) -> bool {
        self.total_items > 0 && self.total_pages > 1
    }

    #[must_use]
    pub fn markers(&self) -> Vec<PageMarker> {
        page_markers(self.page, self.total_pages)
    }
}
