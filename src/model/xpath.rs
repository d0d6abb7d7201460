//! XPath evaluation contract
//!
//! XPath support is supplied by the host through the runtime context's
//! additional slots: a node value and an evaluator. Neither is interpreted
//! by this crate.

use super::value::Value;

/// Evaluates an XPath query against a host-supplied node, returning the
/// string result.
pub trait XPathEvaluator: Send + Sync {
    /// Run `query` against `node`. Failures are wrapped and re-raised by the
    /// evaluation engine, never swallowed.
    fn evaluate(&self, query: &str, node: &Value) -> anyhow::Result<String>;
}
