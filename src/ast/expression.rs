//! Expression node definitions

use crate::parser::{ParseError, ParseResult, ROOT_NAMESPACE_MARKER};
use smallvec::SmallVec;
use std::fmt;

/// A parsed expression token together with the exact source text it consumed.
///
/// `raw` always equals the source substring the token was scanned from, so
/// concatenating the raws of a token list reproduces the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    raw: String,
    kind: ExpressionKind,
}

/// The token kinds of the micro-language, plus the ordered aggregate
///
/// Modeled as a tagged union with exhaustive matching in the evaluator, so
/// adding a kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Literal template text between tokens; always static
    Text(String),

    /// `$[CONTAINER:]path` — variable lookup
    Variable(VariableData),

    /// `$$cuid[.path]` — another unit's computed value
    UnitRef(UnitRefData),

    /// `$$$[ns:]fn(args)` — custom function call (boxed for size)
    Call(Box<CallData>),

    /// `$(expr)` — result re-tokenized and re-evaluated when it is text
    Reeval(Option<Box<Expression>>),

    /// `$xpath(expr)` — result evaluated as an XPath query when it is text
    XPath(Option<Box<Expression>>),

    /// `@[id][|hint]` — attribute access on the owning unit
    Attribute(AttributeData),

    /// Ordered aggregate of sub-expressions covering a multi-token input
    Group(Vec<Expression>),
}

/// Variable lookup data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableData {
    /// Named external container; the implicit internal context when absent
    pub container: Option<String>,
    /// Dotted/indexed accessor path; absent only for container-qualified
    /// lookups, which then resolve to the container itself
    pub path: Option<String>,
}

/// Evaluable-reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRefData {
    /// Id of the referenced child unit; never blank
    pub id: String,
    /// Full accessor path including the leading id segment, present only
    /// when the reference drills past the bare id
    pub path: Option<String>,
}

/// Function-call data (separate struct to keep the enum small)
#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    /// Raw namespace prefix before `:`, possibly the root marker
    pub namespace_group: Option<String>,
    /// Effective explicit namespace; `None` for the root marker
    pub namespace: Option<String>,
    /// Function name; never blank
    pub id: String,
    /// Ordered parameter expressions
    pub params: SmallVec<[Expression; 4]>,
}

/// Attribute-access data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Attribute name; a bare `@` yields the attribute-name set instead
    pub id: Option<String>,
    /// Computation hint
    pub hint: AttributeHint,
}

/// Attribute computation hints (`@attr|hint`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeHint {
    /// `r` — raw attribute value (the default)
    #[default]
    Raw,
    /// `c` — computed attribute value
    Computed,
    /// `x` — reserved for tokenized splitting; currently identical to `c`
    Tokenized,
    /// `n` — whether the attribute is native
    Native,
    /// `N` — whether the attribute is not native
    NotNative,
}

impl AttributeHint {
    /// Parse a hint letter
    pub fn from_char(letter: char) -> Option<Self> {
        match letter {
            'r' => Some(Self::Raw),
            'c' => Some(Self::Computed),
            'x' => Some(Self::Tokenized),
            'n' => Some(Self::Native),
            'N' => Some(Self::NotNative),
            _ => None,
        }
    }

    /// The hint letter
    pub fn as_char(&self) -> char {
        match self {
            Self::Raw => 'r',
            Self::Computed => 'c',
            Self::Tokenized => 'x',
            Self::Native => 'n',
            Self::NotNative => 'N',
        }
    }
}

impl Expression {
    /// Create a plain-text token
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: text.clone(),
            kind: ExpressionKind::Text(text),
        }
    }

    /// Create a variable lookup token
    pub fn variable(
        raw: impl Into<String>,
        container: Option<&str>,
        path: Option<&str>,
    ) -> Self {
        Self {
            raw: raw.into(),
            kind: ExpressionKind::Variable(VariableData {
                container: container.map(str::to_string),
                path: path.map(str::to_string),
            }),
        }
    }

    /// Create an evaluable-reference token; fails fast on a blank id
    pub fn unit_ref(
        raw: impl Into<String>,
        id: impl Into<String>,
        path: Option<&str>,
    ) -> ParseResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParseError::BlankIdentifier {
                kind: "evaluable-reference",
            });
        }
        Ok(Self {
            raw: raw.into(),
            kind: ExpressionKind::UnitRef(UnitRefData {
                id,
                path: path.map(str::to_string),
            }),
        })
    }

    /// Create a function-call token; fails fast on a blank id
    ///
    /// The effective explicit namespace is derived from the namespace group:
    /// the root marker clears it, any other group names it.
    pub fn call(
        raw: impl Into<String>,
        namespace_group: Option<&str>,
        id: impl Into<String>,
        params: Vec<Expression>,
    ) -> ParseResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParseError::BlankIdentifier {
                kind: "function-call",
            });
        }
        let namespace = namespace_group
            .filter(|group| *group != ROOT_NAMESPACE_MARKER)
            .map(str::to_string);
        Ok(Self {
            raw: raw.into(),
            kind: ExpressionKind::Call(Box::new(CallData {
                namespace_group: namespace_group.map(str::to_string),
                namespace,
                id,
                params: params.into(),
            })),
        })
    }

    /// Create a re-evaluated block token
    pub fn reeval(raw: impl Into<String>, inner: Option<Expression>) -> Self {
        Self {
            raw: raw.into(),
            kind: ExpressionKind::Reeval(inner.map(Box::new)),
        }
    }

    /// Create an XPath block token
    pub fn xpath(raw: impl Into<String>, inner: Option<Expression>) -> Self {
        Self {
            raw: raw.into(),
            kind: ExpressionKind::XPath(inner.map(Box::new)),
        }
    }

    /// Create an attribute-access token
    pub fn attribute(raw: impl Into<String>, id: Option<&str>, hint: AttributeHint) -> Self {
        Self {
            raw: raw.into(),
            kind: ExpressionKind::Attribute(AttributeData {
                id: id.map(str::to_string),
                hint,
            }),
        }
    }

    /// Create a group aggregating `children` in order; its raw text is the
    /// concatenation of the children's raws
    pub fn group(children: Vec<Expression>) -> Self {
        let raw = children.iter().map(Expression::raw).collect();
        Self {
            raw,
            kind: ExpressionKind::Group(children),
        }
    }

    /// The exact source substring this token consumed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The token kind
    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    /// The identifier this token carries, when meaningful: the variable's
    /// accessor path, the referenced unit id, the function name, or the
    /// attribute name
    pub fn id(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Variable(data) => data.path.as_deref(),
            ExpressionKind::UnitRef(data) => Some(&data.id),
            ExpressionKind::Call(data) => Some(&data.id),
            ExpressionKind::Attribute(data) => data.id.as_deref(),
            _ => None,
        }
    }

    /// Whether evaluation may produce different values per context
    pub fn is_dynamic(&self) -> bool {
        match &self.kind {
            ExpressionKind::Text(_) => false,
            ExpressionKind::Group(children) => children.iter().any(Expression::is_dynamic),
            _ => true,
        }
    }

    /// The sigil identifying this token kind, used in null-fallback keys.
    /// Plain text and groups carry none.
    pub fn sigil(&self) -> Option<&'static str> {
        match &self.kind {
            ExpressionKind::Text(_) | ExpressionKind::Group(_) => None,
            ExpressionKind::Variable(_) => Some("$"),
            ExpressionKind::UnitRef(_) => Some("$$"),
            ExpressionKind::Call(_) => Some("$$$"),
            ExpressionKind::Reeval(_) => Some("$("),
            ExpressionKind::XPath(_) => Some("$xpath("),
            ExpressionKind::Attribute(_) => Some("@"),
        }
    }

    /// The ordered null-fallback keys for this token: the id-specific key
    /// first (when the kind carries a meaningful id), then the wildcard key.
    pub fn fallback_keys(&self) -> SmallVec<[String; 2]> {
        let mut keys = SmallVec::new();
        let Some(sigil) = self.sigil() else {
            return keys;
        };
        if let Some(id) = self.id() {
            keys.push(format!("eval.{sigil}.{id}.null"));
        }
        keys.push(format!("eval.{sigil}.*.null"));
        keys
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
