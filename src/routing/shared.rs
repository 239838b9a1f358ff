//! Shared, atomically replaceable route table.
//!
//! # Design Decisions
//! - Readers take a snapshot and never block
//! - Writers build a complete new `Router` and swap it in; the three
//!   internal collections are never observed mid-update

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::router::{Lookup, Router};

/// A `Router` behind an `ArcSwap`.
pub struct SharedRouter<T> {
    current: ArcSwap<Router<T>>,
}

impl<T> SharedRouter<T> {
    pub fn new(router: Router<T>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Router<T>> {
        self.current.load_full()
    }

    /// Install a new route table, returning the previous one.
    pub fn replace(&self, router: Router<T>) -> Arc<Router<T>> {
        let previous = self.current.swap(Arc::new(router));
        tracing::info!(
            previous_routes = previous.len(),
            routes = self.current.load().len(),
            "Route table replaced"
        );
        previous
    }

    /// Lookup against the current snapshot.
    pub fn find(&self, verb: &str, path: &str, after: Option<&str>) -> Lookup<T> {
        self.current.load().find(verb, path, after)
    }
}

impl<T> From<Router<T>> for SharedRouter<T> {
    fn from(router: Router<T>) -> Self {
        Self::new(router)
    }
}
