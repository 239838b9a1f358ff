//! Pattern tokenizer.
//!
//! # Responsibilities
//! - Split a pattern body into a flat, ordered sequence of parts
//! - Validate parameter syntax and optional-group balance
//! - Provide the single-pass traversal shared by the compiler and builder
//!
//! # Syntax
//! ```text
//! /              delimiter
//! ( ... )        optional group
//! <name>         parameter, one or more non-slash characters
//! <name=a,b>     parameter restricted to the listed alternatives
//! \x             literal x
//! ```
//!
//! # Design Decisions
//! - Group nesting is expressed by boundary markers, not a tree
//! - Literals carry both the text as written and a normalized encoded form

use std::iter::Peekable;

use crate::routing::encoding::{decode_component, encode_component};
use crate::routing::error::PatternError;

/// Literal route text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// Text as written in the pattern (escapes resolved, may hold `%XX`).
    pub raw: String,
    /// `raw` decoded then re-encoded as a path component.
    pub encoded: String,
}

impl Literal {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let encoded = encode_component(&decode_component(&raw));
        Self { raw, encoded }
    }

    /// The literal with percent escapes resolved.
    pub fn decoded(&self) -> String {
        decode_component(&self.raw)
    }
}

/// One token of a pattern body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Delimiter,
    Literal(Literal),
    Parameter {
        name: String,
        /// Empty when the parameter is unrestricted.
        alternatives: Vec<Literal>,
    },
    GroupBoundary { closing: bool },
}

/// Tokenize a pattern body (flags already stripped).
pub fn tokenize(body: &str) -> Result<Vec<Part>, PatternError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut depth = 0usize;
    let mut chars = body.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => literal.push(escaped),
                None => return Err(PatternError::DanglingEscape { pos }),
            },
            '/' => {
                flush_literal(&mut parts, &mut literal);
                parts.push(Part::Delimiter);
            }
            '(' => {
                flush_literal(&mut parts, &mut literal);
                depth += 1;
                parts.push(Part::GroupBoundary { closing: false });
            }
            ')' => {
                if depth == 0 {
                    return Err(PatternError::UnexpectedGroupClose { pos });
                }
                flush_literal(&mut parts, &mut literal);
                depth -= 1;
                parts.push(Part::GroupBoundary { closing: true });
            }
            '<' => {
                flush_literal(&mut parts, &mut literal);
                parts.push(read_parameter(&mut chars, pos)?);
            }
            _ => literal.push(c),
        }
    }

    if depth > 0 {
        return Err(PatternError::UnclosedGroup { open: depth });
    }

    flush_literal(&mut parts, &mut literal);
    Ok(parts)
}

fn flush_literal(parts: &mut Vec<Part>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(Part::Literal(Literal::new(std::mem::take(literal))));
    }
}

/// Reads `name>` or `name=a,b>` after the opening `<`.
fn read_parameter<I>(chars: &mut Peekable<I>, start: usize) -> Result<Part, PatternError>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut name: Option<String> = None;
    let mut alternatives = Vec::new();
    let mut current = String::new();

    loop {
        let Some((pos, c)) = chars.next() else {
            return Err(PatternError::UnterminatedParameter { pos: start });
        };

        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => current.push(escaped),
                None => return Err(PatternError::DanglingEscape { pos }),
            },
            '=' if name.is_none() => name = Some(std::mem::take(&mut current)),
            ',' if name.is_some() => alternatives.push(std::mem::take(&mut current)),
            '>' => break,
            _ => current.push(c),
        }
    }

    let name = match name {
        Some(name) => {
            alternatives.push(current);
            name
        }
        None => current,
    };

    if name.is_empty() {
        return Err(PatternError::EmptyParameterName { pos: start });
    }

    if alternatives.iter().any(String::is_empty) {
        return Err(PatternError::EmptyAlternative { name });
    }

    Ok(Part::Parameter {
        name,
        alternatives: alternatives.into_iter().map(Literal::new).collect(),
    })
}

/// Concatenate `handler` output for every part, in order.
///
/// The flag tells the handler whether the invocation closes an optional
/// group.
pub fn traverse<F>(parts: &[Part], mut handler: F) -> String
where
    F: FnMut(&Part, bool) -> String,
{
    parts.iter().fold(String::new(), |mut out, part| {
        let closing = matches!(part, Part::GroupBoundary { closing: true });
        out.push_str(&handler(part, closing));
        out
    })
}

/// Shared emptiness predicate for values fed to the reverse builder.
pub fn is_empty_value(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}
