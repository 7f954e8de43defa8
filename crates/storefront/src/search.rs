//! Search box with autocomplete.
//!
//! Every change of the query text issues one remote search; the response
//! becomes both the suggestion dropdown and the result set the product list
//! is filtered from. Responses are matched to the query that produced them
//! with a [`SearchTicket`], so a slow response for an older query can never
//! overwrite the results of a newer one.

use shopfront_core::Product;
use tracing::{debug, warn};

use crate::api::ApiError;

/// Keyboard input handled by the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

/// Identifies the query a search response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// What to do after the query text changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    /// The query is empty: results were cleared, no request is needed.
    Cleared,
    /// Issue `GET /search` for the query and apply the outcome with this ticket.
    Fetch(SearchTicket),
}

/// State of the search input and its suggestion dropdown.
#[derive(Debug, Default)]
pub struct SearchBox {
    query: String,
    suggestions: Vec<Product>,
    highlighted: Option<usize>,
    seq: u64,
}

impl SearchBox {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Product] {
        &self.suggestions
    }

    /// Index of the highlighted suggestion.
    #[must_use]
    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// The dropdown is shown while there is query text and suggestions.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.query.is_empty() && !self.suggestions.is_empty()
    }

    /// Record new query text.
    ///
    /// Resets the highlight and invalidates any response still in flight.
    /// An empty query clears the suggestions immediately.
    pub fn set_query(&mut self, text: &str) -> QueryChange {
        text.clone_into(&mut self.query);
        self.highlighted = None;
        self.seq += 1;

        if self.query.is_empty() {
            self.suggestions.clear();
            QueryChange::Cleared
        } else {
            QueryChange::Fetch(SearchTicket(self.seq))
        }
    }

    /// Apply a search response.
    ///
    /// Returns the new result set, or `None` if the response is for a query
    /// that has since been replaced. A failed search degrades to no
    /// suggestions and an empty result set.
    pub fn apply(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Product>, ApiError>,
    ) -> Option<Vec<Product>> {
        if ticket.0 != self.seq {
            debug!("Discarding stale search response");
            return None;
        }

        let results = outcome.unwrap_or_else(|e| {
            warn!(error = %e, query = %self.query, "Search failed");
            Vec::new()
        });
        self.suggestions.clone_from(&results);
        Some(results)
    }

    /// Handle a key press.
    ///
    /// Returns the new result set when the key selected a suggestion.
    pub fn key(&mut self, key: Key) -> Option<Vec<Product>> {
        let count = self.suggestions.len();
        match key {
            Key::Down if count > 0 => {
                self.highlighted = Some(self.highlighted.map_or(0, |i| (i + 1) % count));
                None
            }
            Key::Up if count > 0 => {
                self.highlighted =
                    Some(self.highlighted.map_or(count - 1, |i| (i + count - 1) % count));
                None
            }
            Key::Enter => match self.highlighted {
                Some(index) => self.select(index),
                None => None,
            },
            Key::Escape => {
                self.suggestions.clear();
                self.highlighted = None;
                None
            }
            Key::Down | Key::Up => None,
        }
    }

    /// Clear the query and suggestions.
    ///
    /// Tickets issued before the reset stay invalid, even if the same text
    /// is searched again later.
    pub fn reset(&mut self) {
        self.query.clear();
        self.suggestions.clear();
        self.highlighted = None;
        self.seq += 1;
    }

    /// Select the suggestion at `index` (pointer or Enter).
    ///
    /// The query becomes the product name, the dropdown closes and the result
    /// set narrows to the selected product.
    pub fn select(&mut self, index: usize) -> Option<Vec<Product>> {
        let selected = self.suggestions.get(index)?.clone();
        selected.name.clone_into(&mut self.query);
        self.suggestions.clear();
        self.highlighted = None;
        // A response still in flight for the typed text must not reopen the dropdown
        self.seq += 1;
        Some(vec![selected])
    }
}

/// A suggestion name split around the first case-insensitive occurrence of
/// the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Locate `query` in `text` ignoring case.
///
/// Returns `None` for an empty query or when there is no match.
#[must_use]
pub fn highlight_match<'a>(text: &'a str, query: &str) -> Option<Highlight<'a>> {
    if query.is_empty() {
        return None;
    }

    text.char_indices().find_map(|(start, _)| {
        let (before, rest) = text.split_at(start);
        let len = match_len(rest, query)?;
        let (matched, after) = rest.split_at(len);
        Some(Highlight {
            before,
            matched,
            after,
        })
    })
}

/// Byte length of the prefix of `haystack` matching `needle` ignoring case.
fn match_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut chars = haystack.char_indices();
    for wanted in needle.chars() {
        let (_, found) = chars.next()?;
        if !found.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map_or(haystack.len(), |(end, _)| end))
}
