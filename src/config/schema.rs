//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use crate::routing::PatternOptions;

/// Root configuration: base matching options plus the ordered route list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Options every route inherits before applying its own flags.
    pub options: PatternOptions,

    /// Routes in registration order.
    pub routes: Vec<RouteConfig>,
}

/// A single route entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route name. Generated when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// Rule string, e.g. `"POST,PUT /items/<id>/ i"`.
    pub rule: String,

    /// Free-form data attached to the route.
    #[serde(default)]
    pub data: toml::Table,
}

impl RouteConfig {
    pub fn new(name: Option<&str>, rule: impl Into<String>) -> Self {
        Self {
            name: name.map(str::to_string),
            rule: rule.into(),
            data: toml::Table::new(),
        }
    }

    /// Name for error messages: the explicit name or `#index`.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{index}"),
        }
    }
}
