//! Parameter splitting for function-call argument lists
//!
//! The raw interior of a call's parentheses is split on top-level commas
//! only: a comma inside a nested parenthesized construct belongs to that
//! construct's own argument list and must never separate the outer call's
//! parameters. Nesting is tracked directly while walking the text.
//!
//! Whitespace around separators is insignificant; each segment is trimmed
//! before being parsed. Literal leading or trailing whitespace in an argument
//! has to be routed through a variable.

use super::error::ParseResult;
use super::scanner::parse;
use crate::ast::Expression;

/// Split the interior text of a call's parentheses into parameter
/// expressions. Empty segments produce no parameter; single-token segments
/// become that token; multi-token segments become a group.
pub(crate) fn split_parameters(interior: &str) -> ParseResult<Vec<Expression>> {
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0;

    for (index, byte) in interior.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                push_segment(&interior[segment_start..index], &mut params)?;
                segment_start = index + 1;
            }
            _ => {}
        }
    }
    push_segment(&interior[segment_start..], &mut params)?;
    Ok(params)
}

fn push_segment(segment: &str, params: &mut Vec<Expression>) -> ParseResult<()> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if let Some(param) = parse(trimmed)? {
        params.push(param);
    }
    Ok(())
}
