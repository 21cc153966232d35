//! Data source that loads its items once, on first use.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::local::LocalDataSource;
use super::{Callback, DataSource};
use crate::item::Item;
use crate::matcher::{Matcher, PrefixMatcher};

/// One-shot loader: receives the callback to hand the full item list to.
pub type BulkLoader = Box<dyn FnOnce(Callback) + Send>;

enum State {
    Idle(BulkLoader),
    /// Only the most recent request survives while loading.
    Loading(Option<(String, Callback)>),
    Ready(LocalDataSource),
}

/// Loads items exactly once, then answers like a [`LocalDataSource`].
pub struct LazilyLoadedDataSource {
    state: Arc<Mutex<State>>,
    matcher: Arc<dyn Matcher>,
    limit: Option<usize>,
}

impl LazilyLoadedDataSource {
    /// Uses [`PrefixMatcher`] once loaded.
    pub fn new<F>(loader: F) -> Self
    where
        F: FnOnce(Callback) + Send + 'static,
    {
        Self::with_matcher(loader, Arc::new(PrefixMatcher))
    }

    /// Uses `matcher` once loaded.
    pub fn with_matcher<F>(loader: F, matcher: Arc<dyn Matcher>) -> Self
    where
        F: FnOnce(Callback) + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(State::Idle(Box::new(loader)))),
            matcher,
            limit: None,
        }
    }

    /// Cap the number of suggestions per answer; `Some(0)` means no cap.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether the loader has delivered its items.
    pub fn is_loaded(&self) -> bool {
        matches!(*lock(&self.state), State::Ready(_))
    }
}

fn lock(state: &Mutex<State>) -> std::sync::MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DataSource for LazilyLoadedDataSource {
    fn suggest(&self, query: &str, callback: Callback) {
        let mut guard = lock(&self.state);
        match std::mem::replace(&mut *guard, State::Loading(None)) {
            State::Ready(local) => {
                let items = local.matching(query);
                *guard = State::Ready(local);
                drop(guard);
                callback(items);
            }
            State::Loading(pending) => {
                if pending.is_some() {
                    debug!(query, "superseding pending lazy request");
                }
                *guard = State::Loading(Some((query.to_string(), callback)));
            }
            State::Idle(loader) => {
                *guard = State::Loading(Some((query.to_string(), callback)));
                drop(guard);

                debug!(query, "triggering lazy load");
                let state = Arc::clone(&self.state);
                let matcher = Arc::clone(&self.matcher);
                let limit = self.limit;
                loader(Box::new(move |items: Vec<Item>| {
                    let local = LocalDataSource::new(items)
                        .with_limit(limit)
                        .with_matcher(Some(matcher));
                    let mut guard = lock(&state);
                    let answer = match std::mem::replace(&mut *guard, State::Loading(None)) {
                        State::Loading(Some((query, callback))) => {
                            Some((local.matching(&query), callback))
                        }
                        _ => None,
                    };
                    *guard = State::Ready(local);
                    drop(guard);

                    debug!("lazy data source loaded");
                    if let Some((items, callback)) = answer {
                        callback(items);
                    }
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::sample_items;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Sink = Arc<Mutex<Vec<(String, Vec<String>)>>>;

    fn recorder(sink: &Sink, tag: &str) -> Callback {
        let sink = Arc::clone(sink);
        let tag = tag.to_string();
        Box::new(move |items: Vec<Item>| {
            let ids = items.iter().filter_map(|i| i.id().map(str::to_string)).collect();
            sink.lock().unwrap().push((tag, ids));
        })
    }

    #[test]
    fn test_loads_once_and_answers_latest_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let parked: Arc<Mutex<Option<Callback>>> = Arc::new(Mutex::new(None));

        let source = {
            let calls = Arc::clone(&calls);
            let parked = Arc::clone(&parked);
            LazilyLoadedDataSource::new(move |done| {
                calls.fetch_add(1, Ordering::SeqCst);
                *parked.lock().unwrap() = Some(done);
            })
        };

        let sink: Sink = Arc::default();
        source.suggest("a", recorder(&sink, "first"));
        source.suggest("bo", recorder(&sink, "second"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sink.lock().unwrap().is_empty());
        assert!(!source.is_loaded());

        let done = parked.lock().unwrap().take().unwrap();
        done(sample_items());

        assert!(source.is_loaded());
        let got = sink.lock().unwrap().clone();
        assert_eq!(
            got,
            vec![("second".to_string(), vec!["bob".to_string(), "bobby".to_string()])]
        );
    }

    #[test]
    fn test_after_load_answers_directly() {
        let source = LazilyLoadedDataSource::new(|done| done(sample_items()));
        let sink: Sink = Arc::default();
        source.suggest("ra", recorder(&sink, "one"));
        source.suggest("lin", recorder(&sink, "two"));
        let got = sink.lock().unwrap().clone();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].1, vec!["radia"]);
        assert_eq!(got[1].1, vec!["linus"]);
    }

    #[test]
    fn test_limit_applies_to_answers() {
        let source =
            LazilyLoadedDataSource::new(|done| done(sample_items())).with_limit(Some(1));
        let sink: Sink = Arc::default();
        source.suggest("bo", recorder(&sink, "one"));
        source.suggest("a", recorder(&sink, "two"));
        let got = sink.lock().unwrap().clone();
        assert_eq!(got[0].1, vec!["bob"]);
        assert_eq!(got[1].1, vec!["alice"]);
    }
}
