//! Item matching.

use crate::item::Item;

/// Decides whether an item matches a query.
pub trait Matcher: Send + Sync {
    /// Whether `item` is a candidate for `query`.
    fn matches(&self, item: &Item, query: &str) -> bool;
}

/// Case-insensitive literal prefix match against an item's keywords and id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixMatcher;

impl Matcher for PrefixMatcher {
    fn matches(&self, item: &Item, query: &str) -> bool {
        let query = query.to_lowercase();
        item.effective_keywords()
            .any(|keyword| keyword.to_lowercase().starts_with(&query))
    }
}
