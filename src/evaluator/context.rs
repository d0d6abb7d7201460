//! Evaluation and runtime contexts
//!
//! The shared evaluation context carries the variable state and capability
//! interfaces; the runtime context binds one evaluation to an owning unit and
//! a small side-channel of extra values. Both are immutable during an
//! in-flight evaluation — callers that mutate backing maps concurrently are
//! on their own.

use crate::model::{CompilationUnit, Value, XPathEvaluator};
use crate::registry::FunctionResolver;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Shared evaluation state: the implicit internal variable map (which doubles
/// as the null-fallback key map), named variable containers, and the function
/// resolver.
#[derive(Default)]
pub struct EvaluationContext {
    internal: IndexMap<String, Value>,
    containers: FxHashMap<String, IndexMap<String, Value>>,
    functions: Option<Arc<dyn FunctionResolver>>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable to the internal context. Keys of the form
    /// `eval.<sigil>.<id>.null` configure null fallbacks.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.internal.insert(name.into(), value.into());
        self
    }

    /// Add a named variable container
    pub fn with_container(
        mut self,
        name: impl Into<String>,
        entries: IndexMap<String, Value>,
    ) -> Self {
        self.containers.insert(name.into(), entries);
        self
    }

    /// Set the function resolver
    pub fn with_functions(mut self, resolver: Arc<dyn FunctionResolver>) -> Self {
        self.functions = Some(resolver);
        self
    }

    /// The internal variable map
    pub fn internal(&self) -> &IndexMap<String, Value> {
        &self.internal
    }

    /// A named container, if present
    pub fn container(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.containers.get(name)
    }

    /// The function resolver, if any
    pub fn functions(&self) -> Option<&Arc<dyn FunctionResolver>> {
        self.functions.as_ref()
    }
}

/// Per-evaluation binding: the owning unit, the shared evaluation context,
/// and the additional-context side channel.
#[derive(Clone)]
pub struct RuntimeContext {
    unit: Option<Arc<dyn CompilationUnit>>,
    evaluation: Arc<EvaluationContext>,
    extra: AdditionalContext,
}

impl RuntimeContext {
    /// Create a context without an owning unit; unit-dependent tokens then
    /// resolve to null
    pub fn new(evaluation: Arc<EvaluationContext>) -> Self {
        Self {
            unit: None,
            evaluation,
            extra: AdditionalContext::default(),
        }
    }

    /// Set the owning unit
    pub fn with_unit(mut self, unit: Arc<dyn CompilationUnit>) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the value substituted for a null `$this` lookup
    pub fn with_this_value(mut self, value: impl Into<Value>) -> Self {
        self.extra.this_value = Some(value.into());
        self
    }

    /// Set the node XPath queries run against
    pub fn with_node(mut self, node: impl Into<Value>) -> Self {
        self.extra.node = Some(node.into());
        self
    }

    /// Set the XPath evaluator
    pub fn with_xpath(mut self, xpath: Arc<dyn XPathEvaluator>) -> Self {
        self.extra.xpath = Some(xpath);
        self
    }

    /// Derive a context owned by `unit`, sharing the evaluation state and
    /// extra values
    pub fn for_unit(&self, unit: Arc<dyn CompilationUnit>) -> Self {
        Self {
            unit: Some(unit),
            evaluation: self.evaluation.clone(),
            extra: self.extra.clone(),
        }
    }

    /// The owning unit, if any
    pub fn unit(&self) -> Option<&Arc<dyn CompilationUnit>> {
        self.unit.as_ref()
    }

    /// The shared evaluation context
    pub fn evaluation(&self) -> &EvaluationContext {
        &self.evaluation
    }

    /// The `$this` substitution value, if supplied
    pub fn this_value(&self) -> Option<&Value> {
        self.extra.this_value.as_ref()
    }

    /// The XPath target node, if supplied
    pub fn node(&self) -> Option<&Value> {
        self.extra.node.as_ref()
    }

    /// The XPath evaluator, if supplied
    pub fn xpath(&self) -> Option<&Arc<dyn XPathEvaluator>> {
        self.extra.xpath.as_ref()
    }
}

/// Named extra values riding alongside an evaluation
#[derive(Clone, Default)]
struct AdditionalContext {
    this_value: Option<Value>,
    node: Option<Value>,
    xpath: Option<Arc<dyn XPathEvaluator>>,
}
