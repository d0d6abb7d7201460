//! Error types for expression parsing

use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while tokenizing or constructing expressions
///
/// Parse failures are fatal: a malformed expression aborts compilation of the
/// owning template. Resolution gaps at evaluation time are a separate,
/// tolerated category (see `EvaluationError`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A bracketed construct never returned to nesting depth zero
    #[error("unbalanced parenthesis at position {position} in expression `{expression}`")]
    UnbalancedParenthesis {
        /// Index of the offending token start in the input
        position: usize,
        /// The full input being tokenized
        expression: String,
    },

    /// A token kind that requires an identifier was constructed with a blank one
    #[error("blank identifier in {kind} expression")]
    BlankIdentifier {
        /// Human-readable token kind ("evaluable-reference", "function-call")
        kind: &'static str,
    },
}
