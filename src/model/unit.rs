//! Compilation-unit contract
//!
//! The template tree itself (XML loading, extension, namespace registration)
//! lives outside this crate; expressions only ever see the owning unit
//! through this trait.

use super::value::Value;
use crate::evaluator::{EvaluationResult, RuntimeContext};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A node of the host's compilation-unit tree, as seen by the evaluator.
pub trait CompilationUnit: Send + Sync {
    /// Resolve a direct child unit by id
    fn child(&self, id: &str) -> Option<Arc<dyn CompilationUnit>>;

    /// An attribute's value; `computed` selects the evaluated form over the
    /// raw one
    fn attribute(&self, name: &str, computed: bool) -> EvaluationResult<Option<Value>>;

    /// The names of all attributes on this unit
    fn attribute_names(&self) -> Vec<String>;

    /// Whether the named attribute is native to the unit kind
    fn is_attribute_native(&self, name: &str) -> bool;

    /// The namespace URI this unit belongs to, inherited by its function
    /// calls unless they name one explicitly
    fn namespace_uri(&self) -> Option<String>;

    /// Produce this unit's computed value. Units that do not support value
    /// evaluation return `None`, which resolves to null at the reference
    /// site.
    fn evaluate(&self, ctx: &RuntimeContext) -> EvaluationResult<Option<Value>> {
        let _ = ctx;
        Ok(None)
    }
}

/// A minimal in-memory unit: fixed attributes, children, namespace, and an
/// optional fixed value. Enough for tests and for hosts without a template
/// tree of their own.
#[derive(Default)]
pub struct StaticUnit {
    children: FxHashMap<String, Arc<dyn CompilationUnit>>,
    attributes: IndexMap<String, Value>,
    computed: IndexMap<String, Value>,
    native: FxHashSet<String>,
    namespace: Option<String>,
    value: Option<Value>,
}

impl StaticUnit {
    /// Create an empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child unit
    pub fn with_child(mut self, id: impl Into<String>, child: Arc<dyn CompilationUnit>) -> Self {
        self.children.insert(id.into(), child);
        self
    }

    /// Add a raw attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Override an attribute's computed form
    pub fn with_computed_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.computed.insert(name.into(), value.into());
        self
    }

    /// Mark an attribute as native
    pub fn with_native_attribute(mut self, name: impl Into<String>) -> Self {
        self.native.insert(name.into());
        self
    }

    /// Set the namespace URI
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the fixed value this unit evaluates to
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl CompilationUnit for StaticUnit {
    fn child(&self, id: &str) -> Option<Arc<dyn CompilationUnit>> {
        self.children.get(id).cloned()
    }

    fn attribute(&self, name: &str, computed: bool) -> EvaluationResult<Option<Value>> {
        let value = if computed {
            self.computed.get(name).or_else(|| self.attributes.get(name))
        } else {
            self.attributes.get(name)
        };
        Ok(value.cloned())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn is_attribute_native(&self, name: &str) -> bool {
        self.native.contains(name)
    }

    fn namespace_uri(&self) -> Option<String> {
        self.namespace.clone()
    }

    fn evaluate(&self, _ctx: &RuntimeContext) -> EvaluationResult<Option<Value>> {
        Ok(self.value.clone())
    }
}
