//! Pattern compilation, matching and reverse building.
//!
//! # Responsibilities
//! - Split trailing flag letters from the templated body
//! - Compile parts into an anchored, encoding-tolerant matcher
//! - Map capture positions back to parameter names on match
//! - Re-render a concrete path from parameter values
//!
//! # Design Decisions
//! - Immutable once built; cheap to share behind `Arc`
//! - The regex engine is a finite automaton, so nested optional groups
//!   cannot cause catastrophic backtracking
//! - Building does not honour group optionality: a group's static text is
//!   always emitted, even when its parameters are omitted

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::routing::encoding::{decode_component, encode_component, is_unreserved};
use crate::routing::error::PatternError;
use crate::routing::tokenizer::{is_empty_value, tokenize, traverse, Literal, Part};

/// Body, then an optional whitespace-separated run of flag letters.
static FLAGGED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\s\S]*?)(?:\s+(\w+))?\s*$").expect("flag splitter is a valid regex")
});

/// Matching options, usually inherited from the owning router and then
/// adjusted by per-pattern flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternOptions {
    /// Anchor the matcher at the start of the path (`s` disables).
    pub anchor_start: bool,

    /// Anchor the matcher at the end of the path (`e` disables).
    pub anchor_end: bool,

    /// Case-insensitive matching (`i` enables).
    pub case_insensitive: bool,

    /// Any other flag letter, keyed by its lowercase form.
    pub custom: BTreeMap<String, bool>,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            anchor_start: true,
            anchor_end: true,
            case_insensitive: false,
            custom: BTreeMap::new(),
        }
    }
}

impl PatternOptions {
    /// Fold a single flag letter. A lowercase letter sets its option, an
    /// uppercase letter clears it.
    pub fn apply_flag(&mut self, flag: char) {
        let lower: String = flag.to_lowercase().collect();
        let is_lower = lower.chars().eq(std::iter::once(flag));

        match lower.as_str() {
            "s" => self.anchor_start = !is_lower,
            "e" => self.anchor_end = !is_lower,
            "i" => self.case_insensitive = is_lower,
            _ => {
                self.custom.insert(lower, is_lower);
            }
        }
    }

    /// Fold every letter of a flag run, left to right.
    pub fn with_flags(mut self, flags: &str) -> Self {
        flags.chars().for_each(|flag| self.apply_flag(flag));
        self
    }

    /// Value of a custom flag, if it was ever set.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.custom.get(name).copied()
    }
}

/// A captured (or supplied) parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    /// One entry per capture site, in source order.
    Many(Vec<String>),
}

impl ParamValue {
    /// Append another value, promoting a scalar to a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            ParamValue::One(first) => {
                let first = std::mem::take(first);
                *self = ParamValue::Many(vec![first, value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }

    /// The scalar value, or the first element of a sequence.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::One(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for ParamValue {
    fn from(values: Vec<S>) -> Self {
        ParamValue::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Named parameter values, as produced by matching and consumed by building.
pub type Params = BTreeMap<String, ParamValue>;

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    options: PatternOptions,
    parts: Vec<Part>,
    matcher: Regex,
    /// One name per capture group, left to right.
    captures: Vec<String>,
    param_names: BTreeSet<String>,
}

impl Pattern {
    /// Compile `source` (body plus optional flags) on top of `base` options.
    pub fn new(source: &str, base: &PatternOptions) -> Result<Self, PatternError> {
        let (body, flags) = split_flags(source);
        let options = base.clone().with_flags(flags);
        let parts = tokenize(body)?;
        let (matcher, captures) = compile_matcher(&parts, &options)?;
        debug_assert_eq!(captures.len() + 1, matcher.captures_len());

        let param_names = captures.iter().cloned().collect();

        Ok(Self {
            source: source.to_string(),
            options,
            parts,
            matcher,
            captures,
            param_names,
        })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Effective options after flag folding.
    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Parameter names bound by at least one capture group.
    pub fn param_names(&self) -> &BTreeSet<String> {
        &self.param_names
    }

    /// Match `path`, returning captured parameters or `None`.
    ///
    /// Captures that did not participate (an optional group that was
    /// skipped) are left out of the result.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let captures = self.matcher.captures(path)?;
        let mut params = Params::new();

        for (name, value) in self.captures.iter().zip(captures.iter().skip(1)) {
            if let Some(value) = value {
                insert_capture(&mut params, name, value.as_str());
            }
        }

        Some(params)
    }

    /// Render a path from `values`.
    ///
    /// Missing or empty values render as nothing. A scalar satisfies only
    /// the first occurrence of its name; a sequence is consumed one element
    /// per occurrence.
    pub fn build(&self, values: &Params) -> String {
        let mut usage: HashMap<String, usize> = HashMap::new();

        traverse(&self.parts, |part, _| match part {
            Part::Delimiter => "/".to_string(),
            Part::Literal(literal) => literal.encoded.clone(),
            Part::Parameter { name, .. } => build_parameter(values, name, &mut usage),
            Part::GroupBoundary { .. } => String::new(),
        })
    }
}

fn split_flags(source: &str) -> (&str, &str) {
    match FLAGGED_PATTERN.captures(source) {
        Some(captures) => (
            captures.get(1).map_or("", |m| m.as_str()),
            captures.get(2).map_or("", |m| m.as_str()),
        ),
        None => (source.trim(), ""),
    }
}

fn compile_matcher(
    parts: &[Part],
    options: &PatternOptions,
) -> Result<(Regex, Vec<String>), PatternError> {
    let case_insensitive = options.case_insensitive;
    let mut captures = Vec::new();

    let body = traverse(parts, |part, closing| match part {
        Part::Delimiter => regex::escape("/"),
        Part::Literal(literal) => compile_literal(literal, case_insensitive),
        Part::Parameter { name, alternatives } => {
            captures.push(name.clone());

            if alternatives.is_empty() {
                return "([^/]+?)".to_string();
            }

            let alternatives: Vec<String> = alternatives
                .iter()
                .map(|alternative| compile_literal(alternative, case_insensitive))
                .collect();
            format!("({})", alternatives.join("|"))
        }
        Part::GroupBoundary { .. } if closing => ")?".to_string(),
        Part::GroupBoundary { .. } => "(?:".to_string(),
    });

    let mut source = String::with_capacity(body.len() + 2);
    if options.anchor_start {
        source.push('^');
    }
    source.push_str(&body);
    if options.anchor_end {
        source.push('$');
    }

    let matcher = RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .build()?;

    Ok((matcher, captures))
}

/// Literal text matches either raw or percent-encoded on the wire.
fn compile_literal(literal: &Literal, case_insensitive: bool) -> String {
    literal.decoded().chars().fold(String::new(), |mut out, c| {
        let mut buf = [0u8; 4];
        let raw: &str = c.encode_utf8(&mut buf);

        if is_unreserved(c) {
            out.push_str(&regex::escape(raw));
            return out;
        }

        out.push_str("(?:");
        out.push_str(&regex::escape(raw));
        out.push('|');
        if case_insensitive {
            out.push_str(&encode_component(&c.to_lowercase().to_string()));
            out.push('|');
            out.push_str(&encode_component(&c.to_uppercase().to_string()));
        } else {
            out.push_str(&encode_component(raw));
        }
        out.push(')');
        out
    })
}

fn insert_capture(params: &mut Params, name: &str, value: &str) {
    let value = if value.contains('%') {
        decode_component(value)
    } else {
        value.to_string()
    };

    match params.get_mut(name) {
        Some(existing) => existing.push(value),
        None => {
            params.insert(name.to_string(), ParamValue::One(value));
        }
    }
}

fn build_parameter(values: &Params, name: &str, usage: &mut HashMap<String, usize>) -> String {
    let Some(value) = values.get(name) else {
        return String::new();
    };

    let index = *usage
        .entry(name.to_string())
        .and_modify(|seen| *seen += 1)
        .or_insert(0);

    let resolved = match value {
        ParamValue::Many(items) => items.get(index).map(String::as_str),
        ParamValue::One(item) if index == 0 => Some(item.as_str()),
        ParamValue::One(_) => None,
    };

    match resolved {
        Some(value) if !is_empty_value(Some(value)) => encode_component(value),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> Pattern {
        Pattern::new(source, &PatternOptions::default()).unwrap()
    }

    fn params(pairs: &[(&str, ParamValue)]) -> Params {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_flags_are_split_from_body() {
        let p = pattern("/news/ se");
        assert_eq!(p.parts().len(), 3);
        assert!(!p.options().anchor_start);
        assert!(!p.options().anchor_end);
        assert!(!p.options().case_insensitive);
    }

    #[test]
    fn test_flag_case_inverts_option() {
        let base = PatternOptions {
            case_insensitive: true,
            ..PatternOptions::default()
        };
        let p = Pattern::new("/ IzXs", &base).unwrap();
        assert!(!p.options().case_insensitive);
        assert!(!p.options().anchor_start);
        assert_eq!(p.options().flag("z"), Some(true));
        assert_eq!(p.options().flag("x"), Some(false));
        assert_eq!(p.options().flag("X"), None);
    }

    #[test]
    fn test_uppercase_anchor_flags_restore_anchors() {
        let base = PatternOptions {
            anchor_start: false,
            anchor_end: false,
            ..PatternOptions::default()
        };
        let p = Pattern::new("/a/ SE", &base).unwrap();
        assert!(p.options().anchor_start);
        assert!(p.options().anchor_end);
        assert!(p.matches("/a/").is_some());
        assert!(p.matches("/x/a/").is_none());
    }

    #[test]
    fn test_match_literal_and_params() {
        let p = pattern("/users/<id>/posts/<post>/");
        let found = p.matches("/users/42/posts/7/").unwrap();
        assert_eq!(found, params(&[("id", "42".into()), ("post", "7".into())]));
        assert!(p.matches("/users/42/posts/").is_none());
        assert!(p.matches("/users/4/2/posts/7/").is_none());
    }

    #[test]
    fn test_start_anchor_flag() {
        assert!(pattern("/news/").matches("/prefix/news/").is_none());
        assert!(pattern("/news/ s").matches("/prefix/news/").is_some());
    }

    #[test]
    fn test_end_anchor_flag() {
        assert!(pattern("/news/").matches("/news/42").is_none());
        assert!(pattern("/news/ e").matches("/news/42").is_some());
    }

    #[test]
    fn test_optional_group() {
        let p = pattern("/news/(<page>/)");
        assert_eq!(p.matches("/news/").unwrap(), Params::new());
        assert_eq!(
            p.matches("/news/3/").unwrap(),
            params(&[("page", "3".into())])
        );
        assert!(p.matches("/news/3").is_none());
    }

    #[test]
    fn test_alternatives_restrict_values() {
        let p = pattern("/<lang=ru,en>/");
        assert_eq!(p.matches("/en/").unwrap(), params(&[("lang", "en".into())]));
        assert!(p.matches("/de/").is_none());
    }

    #[test]
    fn test_literal_matches_raw_or_encoded() {
        let p = pattern("/a b/");
        assert!(p.matches("/a b/").is_some());
        assert!(p.matches("/a%20b/").is_some());
        assert!(p.matches("/a%2520b/").is_none());

        let encoded_source = pattern("/a%20b/");
        assert!(encoded_source.matches("/a b/").is_some());
        assert!(encoded_source.matches("/a%20b/").is_some());
    }

    #[test]
    fn test_case_insensitive_encoded_literal() {
        let p = pattern("/a:b/ i");
        assert!(p.matches("/A:B/").is_some());
        assert!(p.matches("/a%3Ab/").is_some());
        assert!(p.matches("/a%3ab/").is_some());

        let strict = pattern("/a:b/");
        assert!(strict.matches("/a%3Ab/").is_some());
        assert!(strict.matches("/a%3ab/").is_none());
        assert!(strict.matches("/A:B/").is_none());
    }

    #[test]
    fn test_case_insensitive_non_ascii_literal() {
        let p = pattern("/ё/ i");
        assert!(p.matches("/Ё/").is_some());
        assert!(p.matches("/%D0%81/").is_some());
        assert!(p.matches("/%d1%91/").is_some());
    }

    #[test]
    fn test_alternatives_are_encoding_tolerant() {
        let p = pattern("/<tag=a b,c>/");
        assert_eq!(
            p.matches("/a%20b/").unwrap(),
            params(&[("tag", "a b".into())])
        );
    }

    #[test]
    fn test_captured_values_are_decoded() {
        let p = pattern("/files/<name>");
        assert_eq!(
            p.matches("/files/my%20file").unwrap(),
            params(&[("name", "my file".into())])
        );
    }

    #[test]
    fn test_repeated_parameter_collects_values() {
        let p = pattern("/<id>/<id>/<id>/");
        assert_eq!(
            p.matches("/a/b/c/").unwrap(),
            params(&[("id", vec!["a", "b", "c"].into())])
        );

        let pair = pattern("/<id>-<id>");
        assert_eq!(
            pair.matches("/1-2").unwrap(),
            params(&[("id", vec!["1", "2"].into())])
        );
    }

    #[test]
    fn test_param_names() {
        let p = pattern("/<a>/<b>/(<a>/)");
        let names: Vec<&str> = p.param_names().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_build_simple() {
        let p = pattern("/users/<id>/");
        assert_eq!(p.build(&params(&[("id", "a b".into())])), "/users/a%20b/");
        assert_eq!(p.build(&Params::new()), "/users//");
    }

    #[test]
    fn test_build_encodes_literals() {
        let p = pattern("/a b/<x>");
        assert_eq!(p.build(&params(&[("x", "1".into())])), "/a%20b/1");
    }

    #[test]
    fn test_build_repeated_parameter() {
        let p = pattern("/<id>/<id>/");
        assert_eq!(
            p.build(&params(&[("id", vec!["1", "2"].into())])),
            "/1/2/"
        );
        assert_eq!(p.build(&params(&[("id", "1".into())])), "/1//");
        assert_eq!(
            p.build(&params(&[("id", vec!["1"].into())])),
            "/1//"
        );
    }

    #[test]
    fn test_build_keeps_group_text() {
        let p = pattern("/news/(page-<page>/)");
        assert_eq!(
            p.build(&params(&[("page", "2".into())])),
            "/news/page-2/"
        );
        assert_eq!(p.build(&Params::new()), "/news/page-/");
    }

    #[test]
    fn test_build_then_match_round_trip() {
        let p = pattern("/users/<id>/posts/<post>");
        let values = params(&[("id", "a/b c".into()), ("post", "ё".into())]);
        let path = p.build(&values);
        assert_eq!(p.matches(&path).unwrap(), values);
    }

    #[test]
    fn test_param_value_push() {
        let mut value = ParamValue::from("a");
        value.push("b".to_string());
        value.push("c".to_string());
        assert_eq!(value, ParamValue::from(vec!["a", "b", "c"]));
        assert_eq!(value.first(), Some("a"));
    }

    #[test]
    fn test_param_value_serializes_untagged() {
        let values = params(&[("a", "1".into()), ("b", vec!["2", "3"].into())]);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"a":"1","b":["2","3"]}"#);
    }
}
