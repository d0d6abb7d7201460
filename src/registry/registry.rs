//! Namespace-scoped function registry

use super::function::{NativeFunction, TemplateFunction};
use crate::model::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Resolves an invocable by `(namespace, name)`.
///
/// The evaluation context may carry any resolver implementation; the registry
/// below is the in-crate one. An absent resolver, or an unresolved lookup,
/// makes the call site evaluate to null.
pub trait FunctionResolver: Send + Sync {
    /// Look up a function; `None` when nothing is registered under the key
    fn resolve(&self, namespace: Option<&str>, name: &str) -> Option<Arc<dyn TemplateFunction>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FunctionKey {
    namespace: Option<String>,
    name: String,
}

/// Function registry keyed by `(namespace, name)`
#[derive(Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<FunctionKey, Arc<dyn TemplateFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its own name in `namespace`
    pub fn register(&mut self, namespace: Option<&str>, function: Arc<dyn TemplateFunction>) {
        let key = FunctionKey {
            namespace: namespace.map(str::to_string),
            name: function.name().to_string(),
        };
        log::debug!(
            "registering function '{}' in namespace {:?}",
            key.name,
            key.namespace
        );
        self.functions.insert(key, function);
    }

    /// Register a closure under `name` in `namespace`
    pub fn register_fn<F>(&mut self, namespace: Option<&str>, name: impl Into<String>, body: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(namespace, Arc::new(NativeFunction::new(name, body)));
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Whether a function is registered under the key
    pub fn contains(&self, namespace: Option<&str>, name: &str) -> bool {
        self.resolve(namespace, name).is_some()
    }
}

impl FunctionResolver for FunctionRegistry {
    fn resolve(&self, namespace: Option<&str>, name: &str) -> Option<Arc<dyn TemplateFunction>> {
        let key = FunctionKey {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        };
        self.functions.get(&key).cloned()
    }
}
