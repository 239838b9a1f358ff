//! Route registry and dispatch.
//!
//! # Responsibilities
//! - Keep routes in registration order, indexed by name
//! - Track how many routes serve each verb
//! - Resolve (verb, path) to a route, an allow list, or no match
//! - Resume a scan after a previously returned route
//!
//! # Design Decisions
//! - First eligible route in registration order wins
//! - Re-adding a name replaces the route and moves it to the end
//! - A verb no route serves is rejected before any pattern runs
//! - Not thread-safe for mixed writes and reads; see `SharedRouter`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{ConfigError, RouterConfig};
use crate::observability::metrics;
use crate::routing::error::PatternError;
use crate::routing::names::{NameGenerator, SequentialNames, UuidNames};
use crate::routing::pattern::{Params, PatternOptions};
use crate::routing::route::{push_unique, Route};

/// Outcome of a lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// Path and verb matched.
    Found { route: Arc<Route<T>>, params: Params },
    /// Path matched but not for this verb. Carries the verbs that would
    /// have matched; empty when no route serves the verb at all.
    MethodNotAllowed(Vec<String>),
    /// No route matched the path, or the continuation name was unknown.
    NotFound,
}

impl<T> Lookup<T> {
    /// Short label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Lookup::Found { .. } => "found",
            Lookup::MethodNotAllowed(_) => "method_not_allowed",
            Lookup::NotFound => "not_found",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    /// The matched route, if any.
    pub fn route(&self) -> Option<&Arc<Route<T>>> {
        match self {
            Lookup::Found { route, .. } => Some(route),
            _ => None,
        }
    }
}

/// Ordered route table with verb-aware lookup.
pub struct Router<T> {
    options: PatternOptions,
    routes: Vec<Arc<Route<T>>>,
    by_name: HashMap<String, Arc<Route<T>>>,
    verbs: HashMap<String, usize>,
    names: Box<dyn NameGenerator>,
}

impl<T> Router<T> {
    /// Create an empty router. Anonymous routes get UUID names.
    pub fn new(options: PatternOptions) -> Self {
        Self::with_name_generator(options, UuidNames)
    }

    pub fn with_name_generator(options: PatternOptions, names: impl NameGenerator + 'static) -> Self {
        Self {
            options,
            routes: Vec::new(),
            by_name: HashMap::new(),
            verbs: HashMap::new(),
            names: Box::new(names),
        }
    }

    /// Base options every pattern inherits.
    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Register `rule`, replacing any route with the same name.
    ///
    /// The rule is compiled before anything is removed, so a failed
    /// registration leaves the router untouched.
    pub fn add_route(
        &mut self,
        rule: &str,
        name: Option<&str>,
        data: T,
    ) -> Result<Arc<Route<T>>, PatternError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.names.next_name(),
        };
        let route = Arc::new(Route::new(rule, name, &self.options, data)?);

        if self.detach(route.name()).is_some() {
            debug!(name = route.name(), rule, "Replacing route");
        } else {
            debug!(name = route.name(), rule, "Adding route");
        }

        for verb in route.allow() {
            *self.verbs.entry(verb.clone()).or_insert(0) += 1;
        }
        self.by_name.insert(route.name().to_string(), route.clone());
        self.routes.push(route.clone());

        metrics::record_route_count(self.routes.len());
        Ok(route)
    }

    /// Remove a route by name.
    pub fn remove_route(&mut self, name: &str) -> Option<Arc<Route<T>>> {
        let removed = self.detach(name)?;
        debug!(name, "Removed route");
        metrics::record_route_count(self.routes.len());
        Some(removed)
    }

    pub fn get_route(&self, name: &str) -> Option<Arc<Route<T>>> {
        self.by_name.get(name).cloned()
    }

    /// Resolve `verb` and `path`.
    ///
    /// With `after`, the scan starts right after the named route; an
    /// unknown name yields [`Lookup::NotFound`].
    pub fn find(&self, verb: &str, path: &str, after: Option<&str>) -> Lookup<T> {
        let lookup = self.resolve(verb, path, after);
        debug!(verb, path, after, outcome = lookup.outcome(), "Route lookup");
        metrics::record_lookup(lookup.outcome());
        lookup
    }

    fn resolve(&self, verb: &str, path: &str, after: Option<&str>) -> Lookup<T> {
        if !self.verbs.contains_key(verb) {
            return Lookup::MethodNotAllowed(Vec::new());
        }

        let start = match after {
            None => 0,
            Some(name) => match self.position(name) {
                Some(index) => index + 1,
                None => return Lookup::NotFound,
            },
        };

        let mut allow = Vec::new();
        for route in &self.routes[start..] {
            let Some(found) = route.matches(verb, path) else {
                continue;
            };

            if found.verb_allowed {
                return Lookup::Found {
                    route: route.clone(),
                    params: found.params,
                };
            }

            route
                .allow()
                .iter()
                .for_each(|allowed| push_unique(&mut allow, allowed));
        }

        if allow.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allow)
        }
    }

    /// Every route serving `verb` whose pattern matches `path`, in order.
    pub fn find_all(&self, verb: &str, path: &str) -> Vec<(Arc<Route<T>>, Params)> {
        let mut found = Vec::new();
        let mut after: Option<String> = None;

        while let Lookup::Found { route, params } = self.find(verb, path, after.as_deref()) {
            after = Some(route.name().to_string());
            found.push((route, params));
        }

        found
    }

    /// Verbs accepted at `path` by any route, first-seen order.
    pub fn allowed_verbs(&self, path: &str) -> Vec<String> {
        let mut allow = Vec::new();
        self.routes
            .iter()
            .filter(|route| route.pattern().matches(path).is_some())
            .flat_map(|route| route.allow())
            .for_each(|verb| push_unique(&mut allow, verb));
        allow
    }

    /// Routes that serve `verb`, in registration order.
    pub fn routes_for_verb(&self, verb: &str) -> Vec<Arc<Route<T>>> {
        if !self.verbs.contains_key(verb) {
            return Vec::new();
        }

        self.routes
            .iter()
            .filter(|route| route.allows(verb))
            .cloned()
            .collect()
    }

    /// Render a path for the named route.
    pub fn build(&self, name: &str, values: &Params) -> Option<String> {
        self.by_name.get(name).map(|route| route.build(values))
    }

    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route<T>>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of routes serving `verb`.
    pub fn verb_count(&self, verb: &str) -> usize {
        self.verbs.get(verb).copied().unwrap_or(0)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.routes.iter().position(|route| route.name() == name)
    }

    fn detach(&mut self, name: &str) -> Option<Arc<Route<T>>> {
        let route = self.by_name.remove(name)?;

        for verb in route.allow() {
            let remaining = match self.verbs.get_mut(verb) {
                Some(count) => {
                    *count -= 1;
                    *count
                }
                None => continue,
            };
            if remaining == 0 {
                self.verbs.remove(verb);
            }
        }

        if let Some(index) = self.position(name) {
            self.routes.remove(index);
        }

        Some(route)
    }
}

impl Router<toml::Table> {
    /// Build a router from a validated configuration. Unnamed routes are
    /// numbered `route-1`, `route-2`, ... in file order.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        let mut router =
            Router::with_name_generator(config.options.clone(), SequentialNames::default());

        for (index, route) in config.routes.iter().enumerate() {
            router
                .add_route(&route.rule, route.name.as_deref(), route.data.clone())
                .map_err(|source| ConfigError::Route {
                    name: route.label(index),
                    source,
                })?;
        }

        Ok(router)
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new(PatternOptions::default())
    }
}

impl<T> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("options", &self.options)
            .field(
                "routes",
                &self.routes.iter().map(|route| route.name()).collect::<Vec<_>>(),
            )
            .field("verbs", &self.verbs)
            .finish()
    }
}
