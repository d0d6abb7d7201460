//! Expression evaluation engine
//!
//! Per-kind evaluation wrapped by the universal null-fallback: whenever a
//! token resolves to null, the engine consults the ordered fallback keys
//! (`eval.<sigil>.<id>.null`, then `eval.<sigil>.*.null`) against the
//! internal context and substitutes the first present entry.

use super::accessor;
use super::context::RuntimeContext;
use super::error::EvaluationResult;
use crate::ast::{
    AttributeHint, CallData, Expression, ExpressionKind, UnitRefData, VariableData,
};
use crate::evaluator::EvaluationError;
use crate::model::Value;
use crate::parser::{ParseResult, parse};
use crate::registry::FunctionError;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

const DEFAULT_CACHE_SIZE: usize = 1000;

/// Evaluates expression trees against runtime contexts.
///
/// The engine is stateless apart from a bounded cache of parsed expressions,
/// shared by `evaluate_str` and by `$(...)` re-evaluation. It may be used
/// from multiple threads at once; expression trees are immutable.
pub struct ExpressionEngine {
    cache: RwLock<FxHashMap<String, Arc<Expression>>>,
    max_cache_size: usize,
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEngine {
    /// Create an engine with the default cache bound
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_CACHE_SIZE)
    }

    /// Create an engine with a custom cache bound
    pub fn with_cache_size(max_cache_size: usize) -> Self {
        Self {
            cache: RwLock::new(FxHashMap::default()),
            max_cache_size,
        }
    }

    /// Parse `text` (through the cache) and evaluate it. Text that parses to
    /// no expression evaluates to null.
    pub fn evaluate_str(&self, text: &str, ctx: &RuntimeContext) -> EvaluationResult<Value> {
        match self.parse_cached(text)? {
            Some(expression) => self.evaluate(&expression, ctx),
            None => Ok(Value::Null),
        }
    }

    /// Evaluate an expression, applying the null-fallback chain
    pub fn evaluate(&self, expression: &Expression, ctx: &RuntimeContext) -> EvaluationResult<Value> {
        let value = self.evaluate_kind(expression, ctx)?;
        if !value.is_null() {
            return Ok(value);
        }
        for key in expression.fallback_keys() {
            if let Some(fallback) = ctx.evaluation().internal().get(key.as_str()) {
                log::trace!("null fallback hit for `{key}`");
                return Ok(fallback.clone());
            }
        }
        Ok(value)
    }

    fn evaluate_kind(
        &self,
        expression: &Expression,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        match expression.kind() {
            ExpressionKind::Text(text) => Ok(Value::String(text.clone())),
            ExpressionKind::Variable(data) => self.evaluate_variable(data, ctx),
            ExpressionKind::UnitRef(data) => self.evaluate_unit_ref(data, ctx),
            ExpressionKind::Call(data) => self.evaluate_call(data, ctx),
            ExpressionKind::Reeval(inner) => self.evaluate_reeval(inner.as_deref(), ctx),
            ExpressionKind::XPath(inner) => self.evaluate_xpath(inner.as_deref(), ctx),
            ExpressionKind::Attribute(data) => {
                Self::evaluate_attribute(data.id.as_deref(), data.hint, ctx)
            }
            ExpressionKind::Group(children) => self.evaluate_group(children, ctx),
        }
    }

    fn evaluate_variable(
        &self,
        data: &VariableData,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        let value = match &data.container {
            Some(container) => match ctx.evaluation().container(container) {
                None => Value::Null,
                Some(entries) => match data.path.as_deref() {
                    None => Value::Map(entries.clone()),
                    Some(path) => accessor::walk(entries, path)?,
                },
            },
            None => match data.path.as_deref() {
                Some(path) => accessor::walk(ctx.evaluation().internal(), path)?,
                None => Value::Null,
            },
        };

        // a bare `$this` that resolved to nothing picks up the caller-supplied
        // this-value; `$this.x` does not
        if value.is_null() && data.path.as_deref() == Some("this") {
            if let Some(this_value) = ctx.this_value() {
                return Ok(this_value.clone());
            }
        }
        Ok(value)
    }

    fn evaluate_unit_ref(
        &self,
        data: &UnitRefData,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        let Some(unit) = ctx.unit() else {
            return Ok(Value::Null);
        };
        let Some(child) = unit.child(&data.id) else {
            return Ok(Value::Null);
        };
        let child_ctx = ctx.for_unit(child.clone());
        let value = child.evaluate(&child_ctx)?.unwrap_or(Value::Null);
        match data.path.as_deref() {
            None => Ok(value),
            Some(path) => {
                // re-apply the accessor walk over a single-entry map so the
                // path's leading id segment resolves to the child's value
                let mut wrapped = IndexMap::new();
                wrapped.insert(data.id.clone(), value);
                accessor::walk(&wrapped, path)
            }
        }
    }

    fn evaluate_call(&self, data: &CallData, ctx: &RuntimeContext) -> EvaluationResult<Value> {
        let mut args = Vec::with_capacity(data.params.len());
        for param in &data.params {
            args.push(self.evaluate(param, ctx)?);
        }

        let namespace = match data.namespace_group {
            Some(_) => data.namespace.clone(),
            None => ctx.unit().and_then(|unit| unit.namespace_uri()),
        };

        let Some(resolver) = ctx.evaluation().functions() else {
            return Ok(Value::Null);
        };
        let Some(function) = resolver.resolve(namespace.as_deref(), &data.id) else {
            log::debug!(
                "no function registered for '{}' in namespace {:?}",
                data.id,
                namespace
            );
            return Ok(Value::Null);
        };

        if let Some(signature) = function.signature() {
            if !signature.accepts(args.len()) {
                return Err(FunctionError::InvalidArity {
                    name: data.id.clone(),
                    min: signature.min_arity,
                    max: signature.max_arity,
                    actual: args.len(),
                }
                .into());
            }
        }

        let value = function
            .invoke(&args, ctx)
            .map_err(|source| FunctionError::Invocation {
                name: data.id.clone(),
                message: format!("{source:#}"),
            })?;
        Ok(value)
    }

    fn evaluate_reeval(
        &self,
        inner: Option<&Expression>,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        let Some(inner) = inner else {
            return Ok(Value::Null);
        };
        match self.evaluate(inner, ctx)? {
            Value::String(text) => self.evaluate_str(&text, ctx),
            passthrough => Ok(passthrough),
        }
    }

    fn evaluate_xpath(
        &self,
        inner: Option<&Expression>,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        let Some(inner) = inner else {
            return Ok(Value::Null);
        };
        let Value::String(query) = self.evaluate(inner, ctx)? else {
            return Ok(Value::Null);
        };
        let (Some(node), Some(xpath)) = (ctx.node(), ctx.xpath()) else {
            return Ok(Value::Null);
        };
        let result = xpath
            .evaluate(&query, node)
            .map_err(|source| EvaluationError::XPath {
                message: format!("{source:#}"),
            })?;
        Ok(Value::String(result))
    }

    fn evaluate_attribute(
        id: Option<&str>,
        hint: AttributeHint,
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        let Some(unit) = ctx.unit() else {
            return Ok(Value::Null);
        };
        let Some(id) = id else {
            let names = unit
                .attribute_names()
                .into_iter()
                .map(Value::from)
                .collect();
            return Ok(Value::List(names));
        };
        let value = match hint {
            AttributeHint::Raw => unit.attribute(id, false)?,
            // `x` is reserved for tokenized splitting and currently behaves
            // like `c`
            AttributeHint::Computed | AttributeHint::Tokenized => unit.attribute(id, true)?,
            AttributeHint::Native => Some(Value::Boolean(unit.is_attribute_native(id))),
            AttributeHint::NotNative => Some(Value::Boolean(!unit.is_attribute_native(id))),
        };
        Ok(value.unwrap_or(Value::Null))
    }

    fn evaluate_group(
        &self,
        children: &[Expression],
        ctx: &RuntimeContext,
    ) -> EvaluationResult<Value> {
        match children {
            [] => Ok(Value::Null),
            [only] => self.evaluate(only, ctx),
            _ => {
                let mut rendered = String::new();
                for child in children {
                    rendered.push_str(&self.evaluate(child, ctx)?.to_string());
                }
                Ok(Value::String(rendered))
            }
        }
    }

    fn parse_cached(&self, text: &str) -> ParseResult<Option<Arc<Expression>>> {
        if let Some(found) = self.cache.read().get(text) {
            return Ok(Some(found.clone()));
        }
        log::debug!("compiling expression `{text}`");
        let Some(expression) = parse(text)? else {
            return Ok(None);
        };
        let expression = Arc::new(expression);
        let mut cache = self.cache.write();
        if cache.len() >= self.max_cache_size {
            cache.clear();
        }
        cache.insert(text.to_string(), expression.clone());
        Ok(Some(expression))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationContext;
    use pretty_assertions::assert_eq;

    fn ctx_with(entries: &[(&str, Value)]) -> RuntimeContext {
        let mut evaluation = EvaluationContext::new();
        for (name, value) in entries {
            evaluation = evaluation.with_variable(*name, value.clone());
        }
        RuntimeContext::new(Arc::new(evaluation))
    }

    #[test]
    fn text_evaluates_to_itself() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(
            engine.evaluate_str("abc", &ctx).unwrap(),
            Value::from("abc")
        );
    }

    #[test]
    fn variable_resolves_from_internal_context() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("x", Value::from("5"))]);
        assert_eq!(engine.evaluate_str("$x", &ctx).unwrap(), Value::from("5"));
    }

    #[test]
    fn missing_variable_is_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(engine.evaluate_str("$x", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn fallback_key_substitutes_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("eval.$.myvar.null", Value::from("DEFAULT"))]);
        assert_eq!(
            engine.evaluate_str("$myvar", &ctx).unwrap(),
            Value::from("DEFAULT")
        );
    }

    #[test]
    fn id_fallback_wins_over_wildcard() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[
            ("eval.$.*.null", Value::from("STAR")),
            ("eval.$.myvar.null", Value::from("MINE")),
        ]);
        assert_eq!(
            engine.evaluate_str("$myvar", &ctx).unwrap(),
            Value::from("MINE")
        );
        assert_eq!(
            engine.evaluate_str("$other", &ctx).unwrap(),
            Value::from("STAR")
        );
    }

    #[test]
    fn present_but_null_fallback_is_returned_as_is() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("eval.$.myvar.null", Value::Null)]);
        assert_eq!(engine.evaluate_str("$myvar", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn group_concatenates_rendered_values() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("x", Value::Integer(1))]);
        assert_eq!(
            engine.evaluate_str("a$x b", &ctx).unwrap(),
            Value::from("a1 b")
        );
    }

    #[test]
    fn null_renders_empty_in_groups() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(
            engine.evaluate_str("a$missing b", &ctx).unwrap(),
            Value::from("a b")
        );
    }

    #[test]
    fn this_value_substitution_applies_to_bare_this_only() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]).with_this_value(Value::Integer(42));
        assert_eq!(
            engine.evaluate_str("$this", &ctx).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(engine.evaluate_str("$this.foo", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn an_internal_this_variable_wins_over_the_substitution() {
        let engine = ExpressionEngine::new();
        let ctx =
            ctx_with(&[("this", Value::from("set"))]).with_this_value(Value::from("extra"));
        assert_eq!(
            engine.evaluate_str("$this", &ctx).unwrap(),
            Value::from("set")
        );
    }

    #[test]
    fn reeval_reinterprets_text_results() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("pointer", Value::from("$target")), ("target", Value::from("hit"))]);
        assert_eq!(
            engine.evaluate_str("$($pointer)", &ctx).unwrap(),
            Value::from("hit")
        );
    }

    #[test]
    fn reeval_passes_non_text_through() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[("n", Value::Integer(7))]);
        assert_eq!(
            engine.evaluate_str("$($n)", &ctx).unwrap(),
            Value::Integer(7)
        );
    }

    #[test]
    fn xpath_without_node_or_evaluator_is_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(engine.evaluate_str("$xpath(/a/b)", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn unit_tokens_without_a_unit_are_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(engine.evaluate_str("$$child", &ctx).unwrap(), Value::Null);
        assert_eq!(engine.evaluate_str("@attr", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn call_without_resolver_is_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(engine.evaluate_str("$$$f(1)", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn empty_text_is_null() {
        let engine = ExpressionEngine::new();
        let ctx = ctx_with(&[]);
        assert_eq!(engine.evaluate_str("", &ctx).unwrap(), Value::Null);
    }
}
