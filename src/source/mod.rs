//! Pluggable suggestion sources.
//!
//! Every source answers through a callback. [`LocalDataSource`] calls back
//! before `suggest` returns; the lazy and per-query sources may call back
//! later from another task once their loader is done.

pub mod lazy;
pub mod local;
pub mod per_query;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

pub use lazy::LazilyLoadedDataSource;
pub use local::LocalDataSource;
pub use per_query::PerQueryDataSource;

use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;
use crate::item::{self, Item};
use crate::matcher::{Matcher, PrefixMatcher};

/// Receives the suggestions for one `suggest` call.
pub type Callback = Box<dyn FnOnce(Vec<Item>) + Send + 'static>;

/// Something that can suggest items for a query.
pub trait DataSource: Send + Sync {
    /// Ask for suggestions; `callback` is invoked at most once.
    fn suggest(&self, query: &str, callback: Callback);
}

impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn suggest(&self, query: &str, callback: Callback) {
        (**self).suggest(query, callback);
    }
}

/// Build the configured data source.
///
/// The lazy and per-query variants read their file inside spawned tokio
/// tasks, so they must be used from within a runtime.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn DataSource>> {
    let latency = Duration::from_millis(config.latency_ms);
    match config.kind {
        SourceKind::Local => {
            let items = match &config.path {
                Some(path) => item::load_items(path)?,
                None => item::sample_items(),
            };
            debug!(count = items.len(), "local data source ready");
            Ok(Box::new(LocalDataSource::new(items).with_limit(config.limit)))
        }
        SourceKind::Lazy => {
            let path = config.path.clone();
            let limit = config.limit;
            let source = LazilyLoadedDataSource::new(move |done| {
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    done(read_items(path).await);
                });
            })
            .with_limit(limit);
            Ok(Box::new(source))
        }
        SourceKind::PerQuery => {
            let path = config.path.clone();
            let limit = config.limit;
            let matcher: Arc<dyn Matcher> = Arc::new(PrefixMatcher);
            let source = PerQueryDataSource::new(move |query, done| {
                let path = path.clone();
                let query = query.to_string();
                let matcher = Arc::clone(&matcher);
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    let local = LocalDataSource::new(read_items(path).await)
                        .with_limit(limit)
                        .with_matcher(Some(matcher));
                    done(local.matching(&query));
                });
            });
            Ok(Box::new(source))
        }
    }
}

async fn read_items(path: Option<PathBuf>) -> Vec<Item> {
    let Some(path) = path else {
        return item::sample_items();
    };
    match item::load_items_async(&path).await {
        Ok(items) => items,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load items");
            Vec::new()
        }
    }
}
