//! Configuration validation.
//!
//! # Responsibilities
//! - Reject empty rules
//! - Reject explicit names declared twice (runtime upsert is intentional,
//!   a duplicate in one file is not)
//! - Compile every rule so broken patterns never reach a live router

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::Route;

/// A single semantic problem in a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Route {route}: rule is empty")]
    EmptyRule { route: String },

    #[error("Route {route} is declared more than once")]
    DuplicateName { route: String },

    #[error("Route {route}: {message}")]
    InvalidRule { route: String, message: String },
}

/// Validate `config`, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        let label = route.label(index);

        if let Some(name) = &route.name {
            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateName { route: label.clone() });
            }
        }

        if route.rule.trim().is_empty() {
            errors.push(ValidationError::EmptyRule { route: label });
            continue;
        }

        if let Err(e) = Route::new(&route.rule, label.clone(), &config.options, ()) {
            errors.push(ValidationError::InvalidRule {
                route: label,
                message: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
