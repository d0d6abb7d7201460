//! Error types for expression evaluation

use crate::parser::ParseError;
use crate::registry::FunctionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur during expression evaluation
///
/// Resolution gaps (missing variable, child, function, XPath context) are not
/// errors: they resolve to null and flow through the fallback chain. What
/// surfaces here are genuine failures — invoked code that threw, out-of-range
/// indexing, and malformed dynamically produced expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Function invocation error
    #[error("function error: {0}")]
    Function(#[from] FunctionError),

    /// XPath evaluation error reported by the host evaluator
    #[error("xpath error: {message}")]
    XPath {
        /// Rendered cause chain
        message: String,
    },

    /// Index out of bounds during an accessor walk
    #[error("index {index} out of bounds for collection of size {size}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Collection size
        size: usize,
    },

    /// Invalid operation
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Error message
        message: String,
    },

    /// A dynamically produced expression failed to parse
    #[error("dynamic expression parse error: {0}")]
    Parse(#[from] ParseError),
}
