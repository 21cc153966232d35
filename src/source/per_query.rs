//! Data source that asks its loader once per distinct query.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::local::LocalDataSource;
use super::{Callback, DataSource};
use crate::item::Item;
use crate::matcher::Matcher;

/// Per-query loader: receives the query and the callback to answer with.
pub type QueryLoader = Arc<dyn Fn(&str, Callback) + Send + Sync>;

#[derive(Default)]
struct Inner {
    cache: HashMap<String, Vec<Item>>,
    last_query: Option<String>,
}

/// Caches loader results per query and drops out-of-order responses.
pub struct PerQueryDataSource {
    loader: QueryLoader,
    matcher: Option<Arc<dyn Matcher>>,
    inner: Arc<Mutex<Inner>>,
}

impl PerQueryDataSource {
    /// The loader is trusted to have filtered; results pass through as-is.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn(&str, Callback) + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            matcher: None,
            inner: Arc::default(),
        }
    }

    /// Filter loader results through `matcher` before delivering them.
    pub fn with_matcher(mut self, matcher: Arc<dyn Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Whether results for `query` are cached.
    pub fn is_cached(&self, query: &str) -> bool {
        lock(&self.inner).cache.contains_key(query)
    }
}

fn lock(inner: &Mutex<Inner>) -> std::sync::MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Filter `items` for `query` unless a newer query has been asked since.
fn current_answer(
    inner: &Inner,
    query: &str,
    items: &[Item],
    matcher: &Option<Arc<dyn Matcher>>,
) -> Option<Vec<Item>> {
    if inner.last_query.as_deref() != Some(query) {
        debug!(query, last = ?inner.last_query, "dropping out-of-order response");
        return None;
    }
    let local = LocalDataSource::new(items.to_vec()).with_matcher(matcher.clone());
    Some(local.matching(query))
}

impl DataSource for PerQueryDataSource {
    fn suggest(&self, query: &str, callback: Callback) {
        let mut inner = lock(&self.inner);
        inner.last_query = Some(query.to_string());

        if let Some(items) = inner.cache.get(query) {
            let answer = current_answer(&inner, query, items, &self.matcher);
            drop(inner);
            if let Some(items) = answer {
                callback(items);
            }
            return;
        }
        drop(inner);

        debug!(query, "cache miss, calling loader");
        let shared = Arc::clone(&self.inner);
        let matcher = self.matcher.clone();
        let owned_query = query.to_string();
        (self.loader)(
            query,
            Box::new(move |items: Vec<Item>| {
                let mut inner = lock(&shared);
                let answer = current_answer(&inner, &owned_query, &items, &matcher);
                inner.cache.insert(owned_query, items);
                drop(inner);
                if let Some(items) = answer {
                    callback(items);
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::sample_items;
    use crate::matcher::PrefixMatcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Parked = Arc<Mutex<Vec<(String, Callback)>>>;
    type Sink = Arc<Mutex<Vec<String>>>;

    fn parking_source(parked: &Parked, calls: &Arc<AtomicUsize>) -> PerQueryDataSource {
        let parked = Arc::clone(parked);
        let calls = Arc::clone(calls);
        PerQueryDataSource::new(move |query, done| {
            calls.fetch_add(1, Ordering::SeqCst);
            parked.lock().unwrap().push((query.to_string(), done));
        })
    }

    fn recorder(sink: &Sink, tag: &str) -> Callback {
        let sink = Arc::clone(sink);
        let tag = tag.to_string();
        Box::new(move |_items: Vec<Item>| sink.lock().unwrap().push(tag))
    }

    fn take(parked: &Parked, query: &str) -> Callback {
        let mut parked = parked.lock().unwrap();
        let idx = parked.iter().position(|(q, _)| q == query).unwrap();
        parked.remove(idx).1
    }

    #[test]
    fn test_stale_response_is_not_delivered() {
        let parked: Parked = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = parking_source(&parked, &calls);
        let sink: Sink = Arc::default();

        source.suggest("a", recorder(&sink, "a"));
        source.suggest("b", recorder(&sink, "b"));

        take(&parked, "a")(vec![Item::new("alice")]);
        assert!(sink.lock().unwrap().is_empty());
        assert!(source.is_cached("a"));

        take(&parked, "b")(vec![Item::new("bob")]);
        assert_eq!(*sink.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_cache_hit_skips_loader() {
        let parked: Parked = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = parking_source(&parked, &calls);
        let sink: Sink = Arc::default();

        source.suggest("k", recorder(&sink, "first"));
        take(&parked, "k")(vec![Item::new("ken")]);
        source.suggest("k", recorder(&sink, "second"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*sink.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_returning_to_earlier_query_serves_cache() {
        let parked: Parked = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = parking_source(&parked, &calls);
        let sink: Sink = Arc::default();

        source.suggest("a", recorder(&sink, "a1"));
        source.suggest("b", recorder(&sink, "b"));
        take(&parked, "a")(vec![Item::new("alice")]);
        source.suggest("a", recorder(&sink, "a2"));

        assert_eq!(*sink.lock().unwrap(), vec!["a2"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_matcher_filters_loader_results() {
        let source = PerQueryDataSource::new(|_query, done| done(sample_items()))
            .with_matcher(Arc::new(PrefixMatcher));
        let got: Arc<Mutex<Vec<Item>>> = Arc::default();
        let sink = Arc::clone(&got);
        source.suggest("mar", Box::new(move |items: Vec<Item>| *sink.lock().unwrap() = items));
        let got = got.lock().unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id(), Some("margaret"));
    }
}
