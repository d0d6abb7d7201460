//! Abstract syntax tree for the expression micro-language
//!
//! Expression trees are built once by the parser and are immutable
//! afterwards; the same tree may be evaluated any number of times against
//! different runtime contexts.

#![warn(missing_docs)]

mod expression;

pub use expression::*;
