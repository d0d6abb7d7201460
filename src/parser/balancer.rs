//! Bracket matching for parenthesis-bearing tokens
//!
//! Sigil shapes like `$$$fn(...)` cannot be bounded by a linear scan alone:
//! their argument text may itself contain nested parenthesized constructs.
//! The balancer walks forward from a start offset tracking nesting depth and
//! reports the span of the first balanced pair.

/// Find the first balanced `open`/`close` pair at or after `from`.
///
/// Returns `(open_index, close_index)` of the outermost pair, or `None` when
/// the depth never returns to zero or a closing bracket appears at depth zero
/// before any opening one. Both conditions are failure signals that callers
/// surface as a hard parse error.
pub(crate) fn matching_pair(
    input: &str,
    from: usize,
    open: char,
    close: char,
) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut open_index = None;

    for (offset, c) in input[from..].char_indices() {
        let index = from + offset;
        if c == open {
            if depth == 0 {
                open_index = Some(index);
            }
            depth += 1;
        } else if c == close {
            if depth == 0 {
                // stray close before any open
                return None;
            }
            depth -= 1;
            if depth == 0 {
                return Some((open_index?, index));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_pair() {
        assert_eq!(matching_pair("f(a)", 0, '(', ')'), Some((1, 3)));
    }

    #[test]
    fn finds_nested_pair() {
        assert_eq!(matching_pair("f(g(1,2),3)", 0, '(', ')'), Some((1, 10)));
    }

    #[test]
    fn starts_from_offset() {
        assert_eq!(matching_pair("(a)(b)", 3, '(', ')'), Some((3, 5)));
    }

    #[test]
    fn unclosed_open_fails() {
        assert_eq!(matching_pair("f(a", 0, '(', ')'), None);
    }

    #[test]
    fn close_before_open_fails() {
        assert_eq!(matching_pair(")a(b)", 0, '(', ')'), None);
    }

    #[test]
    fn no_brackets_at_all_fails() {
        assert_eq!(matching_pair("abc", 0, '(', ')'), None);
    }
}
