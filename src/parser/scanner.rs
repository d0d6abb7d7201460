//! Hand-written scanner for the expression micro-language
//!
//! The scanner walks the input bytes once, dispatching on the leading sigil of
//! each token shape and tracking bracket nesting natively (via the balancer)
//! for the parenthesis-bearing shapes. Text between tokens is preserved
//! verbatim as plain-text tokens, so the emitted spans cover the input exactly
//! once.
//!
//! Recognized shapes:
//!
//! ```text
//! $$$[ns:]fn(arg1,arg2,...);      function call
//! $$cuid[.path[n]...];            evaluable-reference
//! $[CONTAINER:]path[.path[n]...]; variable
//! $(expr);                        re-evaluated block
//! $xpath(expr);                   XPath query block
//! @[attr][|hint];                 attribute access
//! ```
//!
//! A `$` or `@` immediately preceded by another `$` or by a backslash is not
//! treated as a sigil start. A sigil that does not complete its shape falls
//! back to plain text.

use super::balancer::matching_pair;
use super::error::{ParseError, ParseResult};
use super::splitter::split_parameters;
use crate::ast::{AttributeHint, Expression};

/// Marker used in the namespace position of a call to suppress namespace
/// inheritance from the owning unit (`$$$/:fn(...)`).
pub const ROOT_NAMESPACE_MARKER: &str = "/";

/// Tokenize `input` into an ordered list of expressions covering the whole
/// input. Gaps between sigil tokens become plain-text tokens.
pub fn tokenize(input: &str) -> ParseResult<Vec<Expression>> {
    Scanner::new(input).run()
}

/// Tokenize and collapse: no tokens yield `None`, a single token is returned
/// unwrapped, and multiple tokens are grouped in order.
pub fn parse(input: &str) -> ParseResult<Option<Expression>> {
    let mut tokens = tokenize(input)?;
    Ok(match tokens.len() {
        0 => None,
        1 => tokens.pop(),
        _ => Some(Expression::group(tokens)),
    })
}

#[inline]
fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

#[inline]
fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

#[inline]
fn is_call_head_char(byte: u8) -> bool {
    is_name_char(byte) || byte == b'.' || byte == b':' || byte == b'/'
}

#[inline]
fn is_container_char(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'_'
}

struct Scanner<'input> {
    input: &'input str,
    bytes: &'input [u8],
}

impl<'input> Scanner<'input> {
    fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
        }
    }

    fn run(&self) -> ParseResult<Vec<Expression>> {
        let mut tokens = Vec::new();
        let mut consumed = 0;
        let mut pos = 0;

        while pos < self.bytes.len() {
            let byte = self.bytes[pos];
            if byte != b'$' && byte != b'@' {
                pos += 1;
                continue;
            }
            if pos > 0 && matches!(self.bytes[pos - 1], b'$' | b'\\') {
                // escaped sigil
                pos += 1;
                continue;
            }
            match self.scan_token(pos)? {
                Some((token, end)) => {
                    if consumed < pos {
                        tokens.push(Expression::text(&self.input[consumed..pos]));
                    }
                    tokens.push(token);
                    consumed = end;
                    pos = end;
                }
                None => pos += 1,
            }
        }

        if consumed < self.input.len() {
            tokens.push(Expression::text(&self.input[consumed..]));
        }
        Ok(tokens)
    }

    /// Try to scan one token starting at `start`. Returns the token and the
    /// exclusive end of its span, or `None` when no shape completes here.
    fn scan_token(&self, start: usize) -> ParseResult<Option<(Expression, usize)>> {
        let rest = &self.input[start..];
        if rest.starts_with("$$$") {
            self.scan_call(start)
        } else if rest.starts_with("$xpath(") {
            self.scan_wrapped(start, start + 6, true)
        } else if rest.starts_with("$(") {
            self.scan_wrapped(start, start + 1, false)
        } else if rest.starts_with("$$") {
            self.scan_unit_ref(start)
        } else if rest.starts_with('$') {
            Ok(self.scan_variable(start))
        } else {
            Ok(Some(self.scan_attribute(start)))
        }
    }

    /// `$$$[ns:]fname(args)[;]`
    fn scan_call(&self, start: usize) -> ParseResult<Option<(Expression, usize)>> {
        let head_start = start + 3;
        let mut head_end = head_start;
        while head_end < self.bytes.len() && is_call_head_char(self.bytes[head_end]) {
            head_end += 1;
        }
        if head_end == head_start
            || head_end >= self.bytes.len()
            || self.bytes[head_end] != b'('
        {
            return Ok(None);
        }

        let head = &self.input[head_start..head_end];
        let (namespace_group, id) = match head.split_once(':') {
            Some((group, name)) => (Some(group), name),
            None => (None, head),
        };
        if id.is_empty() || !id.bytes().all(is_name_char) {
            return Ok(None);
        }
        if let Some(group) = namespace_group {
            if group.is_empty() {
                return Ok(None);
            }
        }

        let Some((open, close)) = matching_pair(self.input, head_end, '(', ')') else {
            return Err(ParseError::UnbalancedParenthesis {
                position: start,
                expression: self.input.to_string(),
            });
        };
        let params = split_parameters(&self.input[open + 1..close])?;
        let end = self.absorb_separator(close + 1);
        let raw = &self.input[start..end];
        let token = Expression::call(raw, namespace_group, id, params)?;
        Ok(Some((token, end)))
    }

    /// `$(expr)[;]` and `$xpath(expr)[;]`
    fn scan_wrapped(
        &self,
        start: usize,
        open_at: usize,
        is_xpath: bool,
    ) -> ParseResult<Option<(Expression, usize)>> {
        let Some((open, close)) = matching_pair(self.input, open_at, '(', ')') else {
            return Err(ParseError::UnbalancedParenthesis {
                position: start,
                expression: self.input.to_string(),
            });
        };
        let inner = parse(&self.input[open + 1..close])?;
        let end = self.absorb_separator(close + 1);
        let raw = &self.input[start..end];
        let token = if is_xpath {
            Expression::xpath(raw, inner)
        } else {
            Expression::reeval(raw, inner)
        };
        Ok(Some((token, end)))
    }

    /// `$$cuid[.path[n]...][;]`
    fn scan_unit_ref(&self, start: usize) -> ParseResult<Option<(Expression, usize)>> {
        let id_start = start + 2;
        let mut id_end = id_start;
        if id_end < self.bytes.len() && is_ident_start(self.bytes[id_end]) {
            id_end += 1;
            while id_end < self.bytes.len() && is_name_char(self.bytes[id_end]) {
                id_end += 1;
            }
        }
        if id_end == id_start {
            return Ok(None);
        }

        let path_end = self.read_path(id_start, false);
        let path = if path_end > id_end {
            Some(&self.input[id_start..path_end])
        } else {
            None
        };
        let end = self.absorb_separator(path_end);
        let raw = &self.input[start..end];
        let token = Expression::unit_ref(raw, &self.input[id_start..id_end], path)?;
        Ok(Some((token, end)))
    }

    /// `$[CONTAINER:]path[;]` — container names are uppercase, which is what
    /// keeps `$var: text` from being read as a container lookup
    fn scan_variable(&self, start: usize) -> Option<(Expression, usize)> {
        let after = start + 1;
        let mut ident_end = after;
        while ident_end < self.bytes.len() && is_container_char(self.bytes[ident_end]) {
            ident_end += 1;
        }

        let (container, path_start) = if ident_end > after
            && !self.bytes[after].is_ascii_digit()
            && ident_end < self.bytes.len()
            && self.bytes[ident_end] == b':'
        {
            (Some(&self.input[after..ident_end]), ident_end + 1)
        } else {
            (None, after)
        };

        let path_end = self.read_path(path_start, container.is_some());
        let path = &self.input[path_start..path_end];
        if container.is_none() && path.is_empty() {
            return None;
        }

        let end = self.absorb_separator(path_end);
        let raw = &self.input[start..end];
        let path = (!path.is_empty()).then_some(path);
        Some((Expression::variable(raw, container, path), end))
    }

    /// `@[id][|hint][;]` — always completes; a bare `@` is the
    /// attribute-name-set token.
    fn scan_attribute(&self, start: usize) -> (Expression, usize) {
        let id_start = start + 1;
        let mut pos = id_start;
        if pos < self.bytes.len() && is_ident_start(self.bytes[pos]) {
            pos += 1;
            while pos < self.bytes.len() && is_name_char(self.bytes[pos]) {
                pos += 1;
            }
        }
        let id = (pos > id_start).then(|| &self.input[id_start..pos]);

        let mut hint = AttributeHint::default();
        if pos + 1 < self.bytes.len() && self.bytes[pos] == b'|' {
            if let Some(parsed) = AttributeHint::from_char(self.bytes[pos + 1] as char) {
                hint = parsed;
                pos += 2;
            }
        }

        let end = self.absorb_separator(pos);
        (Expression::attribute(&self.input[start..end], id, hint), end)
    }

    /// A `;` immediately after a completed token is part of its span, so it is
    /// never re-emitted as plain text. Any other following character is left
    /// for the next scan step.
    #[inline]
    fn absorb_separator(&self, end: usize) -> usize {
        if end < self.bytes.len() && self.bytes[end] == b';' {
            end + 1
        } else {
            end
        }
    }

    /// Read a dotted accessor path (`seg[0].seg[].seg`) starting at `start`.
    /// Returns the exclusive end; a trailing `.` is not part of the path.
    /// `allow_leading_suffix` permits a path that is only index/size suffixes
    /// (`[]`), used for container-qualified variables.
    fn read_path(&self, start: usize, allow_leading_suffix: bool) -> usize {
        let mut pos = match self.read_segment(start, allow_leading_suffix) {
            end if end > start => end,
            _ => return start,
        };
        while pos < self.bytes.len() && self.bytes[pos] == b'.' {
            let next = self.read_segment(pos + 1, false);
            if next == pos + 1 {
                break;
            }
            pos = next;
        }
        pos
    }

    /// One path segment: a name followed by any number of `[n]`/`[]` suffixes.
    fn read_segment(&self, start: usize, allow_leading_suffix: bool) -> usize {
        let mut pos = start;
        if pos < self.bytes.len() && is_ident_start(self.bytes[pos]) {
            pos += 1;
            while pos < self.bytes.len() && is_name_char(self.bytes[pos]) {
                pos += 1;
            }
        }
        if pos == start && !allow_leading_suffix {
            return start;
        }
        while let Some(end) = self.read_index_suffix(pos) {
            pos = end;
        }
        pos
    }

    /// `[digits]` or `[]`; returns the exclusive end or `None`.
    fn read_index_suffix(&self, pos: usize) -> Option<usize> {
        if pos >= self.bytes.len() || self.bytes[pos] != b'[' {
            return None;
        }
        let mut cursor = pos + 1;
        while cursor < self.bytes.len() && self.bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        (cursor < self.bytes.len() && self.bytes[cursor] == b']').then_some(cursor + 1)
    }
}
