//! Routes: a compiled pattern plus the verbs it serves.
//!
//! # Rule Syntax
//! ```text
//! [VERB[,VERB...] ]pattern[ flags]
//!
//! /news/(<page>/)          GET, HEAD
//! POST,PUT /upload/<id>/   POST, PUT
//! * /status/ i             every known method, case-insensitive
//! ```
//!
//! # Design Decisions
//! - No verbs means GET; GET always brings HEAD along
//! - Verb lists are deduplicated, first-seen order preserved
//! - Routes are never mutated after construction

use std::sync::LazyLock;

use regex::Regex;

use crate::routing::error::PatternError;
use crate::routing::pattern::{Params, Pattern, PatternOptions};

/// Methods granted by the `*` verb, sorted.
pub const KNOWN_METHODS: &[&str] = &[
    "ACL",
    "BIND",
    "CHECKOUT",
    "CONNECT",
    "COPY",
    "DELETE",
    "GET",
    "HEAD",
    "LINK",
    "LOCK",
    "M-SEARCH",
    "MERGE",
    "MKACTIVITY",
    "MKCALENDAR",
    "MKCOL",
    "MOVE",
    "NOTIFY",
    "OPTIONS",
    "PATCH",
    "POST",
    "PROPFIND",
    "PROPPATCH",
    "PURGE",
    "PUT",
    "REBIND",
    "REPORT",
    "SEARCH",
    "SOURCE",
    "SUBSCRIBE",
    "TRACE",
    "UNBIND",
    "UNLINK",
    "UNLOCK",
    "UNSUBSCRIBE",
];

static VERB_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:[A-Z][A-Z-]*|\*)(?:\s*,\s*(?:[A-Z][A-Z-]*|\*))*)\s+(\S[\s\S]*)$")
        .expect("verb prefix is a valid regex")
});

/// Result of testing a route against a verb and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Whether the route serves the requested verb.
    pub verb_allowed: bool,
    /// Parameters captured from the path.
    pub params: Params,
}

/// A registered route.
#[derive(Debug)]
pub struct Route<T> {
    name: String,
    allow: Vec<String>,
    pattern: Pattern,
    data: T,
}

impl<T> Route<T> {
    /// Parse `rule` and compile its pattern on top of `options`.
    pub fn new(
        rule: &str,
        name: impl Into<String>,
        options: &PatternOptions,
        data: T,
    ) -> Result<Self, PatternError> {
        let (verbs, source) = split_verbs(rule);

        Ok(Self {
            name: name.into(),
            allow: resolve_verbs(verbs),
            pattern: Pattern::new(source, options)?,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Verbs served by this route.
    pub fn allow(&self) -> &[String] {
        &self.allow
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn allows(&self, verb: &str) -> bool {
        self.allow.iter().any(|allowed| allowed == verb)
    }

    /// `None` when the path does not match at all, regardless of verb.
    pub fn matches(&self, verb: &str, path: &str) -> Option<RouteMatch> {
        self.pattern.matches(path).map(|params| RouteMatch {
            verb_allowed: self.allows(verb),
            params,
        })
    }

    /// Render a path for this route.
    pub fn build(&self, values: &Params) -> String {
        self.pattern.build(values)
    }
}

fn split_verbs(rule: &str) -> (Option<&str>, &str) {
    match VERB_PREFIX.captures(rule) {
        Some(captures) => (
            captures.get(1).map(|m| m.as_str()),
            captures.get(2).map_or(rule, |m| m.as_str()),
        ),
        None => (None, rule),
    }
}

fn resolve_verbs(list: Option<&str>) -> Vec<String> {
    let mut tokens: Vec<&str> = list
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if tokens.is_empty() {
        tokens.push("GET");
    }

    let mut allow = Vec::new();
    for token in tokens {
        if token == "*" {
            KNOWN_METHODS
                .iter()
                .for_each(|method| push_unique(&mut allow, method));
            continue;
        }

        push_unique(&mut allow, token);
        if token == "GET" {
            push_unique(&mut allow, "HEAD");
        }
    }

    allow
}

/// Append `verb` unless already present.
pub(crate) fn push_unique(list: &mut Vec<String>, verb: &str) {
    if !list.iter().any(|existing| existing == verb) {
        list.push(verb.to_string());
    }
}
