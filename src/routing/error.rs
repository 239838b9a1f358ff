//! Pattern compilation errors.

use thiserror::Error;

/// Errors raised while turning a rule string into a compiled pattern.
///
/// Query operations (`matches`, `build`, `find`) never fail; only
/// construction does.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    /// A `<` was never closed by `>`.
    #[error("Unterminated parameter starting at offset {pos}")]
    UnterminatedParameter { pos: usize },

    /// `<>` or `<=a,b>`.
    #[error("Empty parameter name at offset {pos}")]
    EmptyParameterName { pos: usize },

    /// `<name=a,,b>` or `<name=>`.
    #[error("Empty alternative in parameter `{name}`")]
    EmptyAlternative { name: String },

    /// A `)` with no open group.
    #[error("Unexpected `)` at offset {pos}")]
    UnexpectedGroupClose { pos: usize },

    /// Input ended with optional groups still open.
    #[error("{open} optional group(s) left open")]
    UnclosedGroup { open: usize },

    /// A trailing `\` with nothing to escape.
    #[error("Dangling escape at offset {pos}")]
    DanglingEscape { pos: usize },

    /// The generated matcher was rejected by the regex engine.
    #[error("Failed to compile matcher: {0}")]
    Regex(#[from] regex::Error),
}
