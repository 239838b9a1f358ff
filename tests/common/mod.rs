//! Shared utilities for integration tests.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;
use verb_router::routing::SequentialNames;
use verb_router::{ParamValue, Params, PatternOptions, Router};

/// Build a router with deterministic names from `(rule, name)` pairs.
#[allow(dead_code)]
pub fn router(rules: &[(&str, &str)]) -> Router<()> {
    let mut router =
        Router::with_name_generator(PatternOptions::default(), SequentialNames::new("t"));
    for (rule, name) in rules {
        router.add_route(rule, Some(name), ()).unwrap();
    }
    router
}

/// Params from `(name, value)` pairs; repeated names become sequences.
#[allow(dead_code)]
pub fn params(pairs: &[(&str, &str)]) -> Params {
    let mut params = Params::new();
    for (name, value) in pairs {
        match params.get_mut(*name) {
            Some(existing) => existing.push(value.to_string()),
            None => {
                params.insert(name.to_string(), ParamValue::from(*value));
            }
        }
    }
    params
}

/// Write `contents` to a fresh file under the system temp dir.
#[allow(dead_code)]
pub fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("routes-{}.toml", Uuid::new_v4()));
    fs::write(&path, contents).unwrap();
    path
}
