//! Accessor-hierarchy walk
//!
//! Pure data-structure navigation over maps and lists; it knows nothing about
//! expression kinds. A dotted path drills into nested maps, `[n]` indexes
//! into lists, and `[]` yields a collection's size. Missing keys and descent
//! into non-map values resolve to null; an out-of-range index is a failure,
//! not a null.

use super::error::{EvaluationError, EvaluationResult};
use crate::model::Value;
use indexmap::IndexMap;

enum Suffix {
    Index(usize),
    Size,
}

/// Walk `path` into `map`. The whole-container `[]` path short-circuits to
/// the map's size.
pub(crate) fn walk(map: &IndexMap<String, Value>, path: &str) -> EvaluationResult<Value> {
    if path == "[]" {
        return Ok(Value::Integer(map.len() as i64));
    }

    let mut current = Value::Map(map.clone());
    for segment in path.split('.') {
        let (name, suffixes) = parse_segment(segment);
        if !name.is_empty() {
            current = match current.as_map().and_then(|entries| entries.get(name)) {
                Some(found) => found.clone(),
                None => return Ok(Value::Null),
            };
        }
        for suffix in suffixes {
            current = apply_suffix(current, suffix)?;
        }
    }
    Ok(current)
}

/// Split one path segment into its name and trailing `[n]`/`[]` suffixes.
/// Anything malformed past the name is ignored; the scanner only emits
/// well-formed suffixes.
fn parse_segment(segment: &str) -> (&str, Vec<Suffix>) {
    let Some(bracket) = segment.find('[') else {
        return (segment, Vec::new());
    };
    let (name, mut rest) = segment.split_at(bracket);
    let mut suffixes = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(end) = stripped.find(']') else {
            break;
        };
        let digits = &stripped[..end];
        if digits.is_empty() {
            suffixes.push(Suffix::Size);
        } else {
            match digits.parse::<usize>() {
                Ok(index) => suffixes.push(Suffix::Index(index)),
                Err(_) => break,
            }
        }
        rest = &stripped[end + 1..];
    }
    (name, suffixes)
}

fn apply_suffix(current: Value, suffix: Suffix) -> EvaluationResult<Value> {
    match suffix {
        Suffix::Size => Ok(current
            .size()
            .map(|size| Value::Integer(size as i64))
            .unwrap_or(Value::Null)),
        Suffix::Index(index) => match current {
            Value::List(items) => {
                let size = items.len();
                items
                    .into_iter()
                    .nth(index)
                    .ok_or(EvaluationError::IndexOutOfBounds {
                        index: index as i64,
                        size,
                    })
            }
            Value::Map(_) | Value::Null => Ok(Value::Null),
            other => Err(EvaluationError::InvalidOperation {
                message: format!("cannot index into {other:?} with [{index}]"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture() -> IndexMap<String, Value> {
        let Value::Map(map) = Value::from(json!({
            "user": {
                "name": "ada",
                "tags": ["admin", "ops"],
                "teams": [{"id": "t1"}, {"id": "t2"}],
            },
            "count": 3,
        })) else {
            unreachable!("fixture is an object");
        };
        map
    }

    #[test]
    fn walks_nested_maps() {
        assert_eq!(walk(&fixture(), "user.name").unwrap(), Value::from("ada"));
    }

    #[test]
    fn indexes_into_lists() {
        assert_eq!(
            walk(&fixture(), "user.tags[1]").unwrap(),
            Value::from("ops")
        );
        assert_eq!(
            walk(&fixture(), "user.teams[0].id").unwrap(),
            Value::from("t1")
        );
    }

    #[test]
    fn size_suffix_counts_collections() {
        assert_eq!(walk(&fixture(), "user.tags[]").unwrap(), Value::Integer(2));
        assert_eq!(walk(&fixture(), "user[]").unwrap(), Value::Integer(3));
    }

    #[test]
    fn whole_container_size_short_circuits() {
        assert_eq!(walk(&fixture(), "[]").unwrap(), Value::Integer(2));
    }

    #[test]
    fn missing_key_is_null() {
        assert_eq!(walk(&fixture(), "user.missing").unwrap(), Value::Null);
        assert_eq!(walk(&fixture(), "nope.deeper").unwrap(), Value::Null);
    }

    #[test]
    fn descent_into_non_map_is_null() {
        assert_eq!(walk(&fixture(), "count.inner").unwrap(), Value::Null);
    }

    #[test]
    fn out_of_range_index_is_a_failure() {
        assert_eq!(
            walk(&fixture(), "user.tags[9]").unwrap_err(),
            EvaluationError::IndexOutOfBounds { index: 9, size: 2 }
        );
    }

    #[test]
    fn size_of_scalar_is_null() {
        assert_eq!(walk(&fixture(), "count[]").unwrap(), Value::Null);
    }

    #[test]
    fn indexing_a_scalar_is_invalid() {
        assert!(matches!(
            walk(&fixture(), "count[0]").unwrap_err(),
            EvaluationError::InvalidOperation { .. }
        ));
    }
}
