//! In-memory data source.

use std::sync::Arc;

use super::{Callback, DataSource};
use crate::item::Item;
use crate::matcher::{Matcher, PrefixMatcher};

/// Filters a fixed item list.
#[derive(Clone)]
pub struct LocalDataSource {
    items: Vec<Item>,
    limit: Option<usize>,
    matcher: Option<Arc<dyn Matcher>>,
}

impl LocalDataSource {
    /// Unbounded source using [`PrefixMatcher`].
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            limit: None,
            matcher: Some(Arc::new(PrefixMatcher)),
        }
    }

    /// Stop after `limit` matches. `None` or `Some(0)` means unbounded.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }

    /// Replace the matcher; `None` lets every item through.
    pub fn with_matcher(mut self, matcher: Option<Arc<dyn Matcher>>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Matching items in source order, capped at the limit.
    pub fn matching(&self, query: &str) -> Vec<Item> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.items
            .iter()
            .filter(|item| match &self.matcher {
                Some(matcher) => matcher.matches(item, query),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the source holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DataSource for LocalDataSource {
    fn suggest(&self, query: &str, callback: Callback) {
        callback(self.matching(query));
    }
}
