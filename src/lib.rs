//! Embedded expression micro-language for template engines
//!
//! Templates express dynamic values through a small sigil-based syntax:
//!
//! ```text
//! $$$[ns:]fn(arg1,arg2,...);      function call
//! $$cuid[.path[n]...];            evaluable-reference
//! $[CONTAINER:]path[.path[n]...]; variable
//! $(expr);                        re-evaluated block
//! $xpath(expr);                   XPath query block
//! @[attr][|hint];                 attribute access, hint in {r,c,x,n,N}
//! ```
//!
//! `parse` turns raw text into an immutable expression tree;
//! [`ExpressionEngine`] evaluates trees against a [`RuntimeContext`].
//! Malformed syntax fails at parse time with a precise error; missing data at
//! evaluation time resolves to null through a configurable fallback chain, so
//! partial data never halts rendering.
//!
//! ```
//! use std::sync::Arc;
//! use templex::{EvaluationContext, ExpressionEngine, RuntimeContext, Value};
//!
//! let engine = ExpressionEngine::new();
//! let evaluation = EvaluationContext::new().with_variable("name", "world");
//! let ctx = RuntimeContext::new(Arc::new(evaluation));
//!
//! let greeting = engine.evaluate_str("hello $name!", &ctx).unwrap();
//! assert_eq!(greeting, Value::from("hello world!"));
//! ```

pub mod ast;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;

// Re-export main types
pub use ast::{AttributeHint, Expression, ExpressionKind};
pub use evaluator::{
    EvaluationContext, EvaluationError, EvaluationResult, ExpressionEngine, RuntimeContext,
};
pub use model::{CompilationUnit, StaticUnit, Value, XPathEvaluator};
pub use parser::{ParseError, ParseResult, ROOT_NAMESPACE_MARKER, parse, tokenize};
pub use registry::{
    FunctionError, FunctionRegistry, FunctionResolver, FunctionSignature, NativeFunction,
    TemplateFunction,
};
