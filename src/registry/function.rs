//! Template function contract

use crate::evaluator::RuntimeContext;
use crate::model::Value;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function invocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// The function body failed; the cause is preserved as a message
    #[error("function '{name}' invocation failed: {message}")]
    Invocation {
        /// Function name
        name: String,
        /// Rendered cause chain
        message: String,
    },
}

/// Declared arity bounds for a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

impl FunctionSignature {
    /// Create a signature with fixed bounds
    pub fn new(name: impl Into<String>, min_arity: usize, max_arity: Option<usize>) -> Self {
        Self {
            name: name.into(),
            min_arity,
            max_arity,
        }
    }

    /// Whether `actual` arguments satisfy the bounds
    pub fn accepts(&self, actual: usize) -> bool {
        actual >= self.min_arity && self.max_arity.is_none_or(|max| actual <= max)
    }
}

/// A host-supplied function invocable from `$$$[ns:]fn(...)` expressions.
///
/// Invocation failures are reported through `anyhow`; the engine wraps them
/// into `FunctionError::Invocation` and re-raises.
pub trait TemplateFunction: Send + Sync {
    /// The function name
    fn name(&self) -> &str;

    /// Declared arity bounds, checked by the engine before invocation
    fn signature(&self) -> Option<&FunctionSignature> {
        None
    }

    /// Invoke with already-evaluated arguments
    fn invoke(&self, args: &[Value], ctx: &RuntimeContext) -> anyhow::Result<Value>;
}

type NativeBody = dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A function backed by a closure
pub struct NativeFunction {
    name: String,
    signature: Option<FunctionSignature>,
    body: Box<NativeBody>,
}

impl NativeFunction {
    /// Wrap a closure as a function
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: None,
            body: Box::new(body),
        }
    }

    /// Wrap a closure with declared arity bounds
    pub fn with_arity<F>(
        name: impl Into<String>,
        min_arity: usize,
        max_arity: Option<usize>,
        body: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            signature: Some(FunctionSignature::new(name.clone(), min_arity, max_arity)),
            name,
            body: Box::new(body),
        }
    }
}

impl TemplateFunction for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Option<&FunctionSignature> {
        self.signature.as_ref()
    }

    fn invoke(&self, args: &[Value], _ctx: &RuntimeContext) -> anyhow::Result<Value> {
        (self.body)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_bounds() {
        let fixed = FunctionSignature::new("f", 1, Some(2));
        assert!(!fixed.accepts(0));
        assert!(fixed.accepts(1));
        assert!(fixed.accepts(2));
        assert!(!fixed.accepts(3));

        let variadic = FunctionSignature::new("v", 0, None);
        assert!(variadic.accepts(0));
        assert!(variadic.accepts(100));
    }
}
