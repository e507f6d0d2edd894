use std::collections::BTreeMap;

use gateway_core::Value;

use crate::ast::{FilterAst, Op};
use crate::error::FilterError;

/// Evaluate `ast` against `doc`, treating dotted field names (`"address.city"`)
/// as a path into nested `Value::Obj`s.
pub fn matches(doc: &BTreeMap<String, Value>, ast: &FilterAst) -> Result<bool, FilterError> {
    match ast {
        FilterAst::Leaf { field, op, value } => eval_leaf(doc, field, *op, value),
        FilterAst::And(items) => {
            for item in items {
                if !matches(doc, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        FilterAst::Or(items) => {
            for item in items {
                if matches(doc, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        FilterAst::Not(inner) => Ok(!matches(doc, inner)?),
        FilterAst::Nor(items) => {
            for item in items {
                if matches(doc, item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn get_path<'a>(doc: &'a BTreeMap<String, Value>, field: &str) -> Option<&'a Value> {
    let mut segments = field.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = current.as_obj()?.get(segment)?;
    }
    Some(current)
}

fn eval_leaf(doc: &BTreeMap<String, Value>, field: &str, op: Op, literal: &Value) -> Result<bool, FilterError> {
    let found = get_path(doc, field);

    if op == Op::Exists {
        let want = literal.as_bool().unwrap_or(true);
        let present = matches!(found, Some(v) if !v.is_null());
        return Ok(present == want);
    }

    let Some(found) = found else {
        return Ok(matches!(op, Op::Ne | Op::Nin));
    };

    Ok(match op {
        Op::Eq => values_equal(found, literal),
        Op::Ne => !values_equal(found, literal),
        Op::Gt => numeric_cmp(found, literal).is_some_and(|o| o == std::cmp::Ordering::Greater),
        Op::Gte => numeric_cmp(found, literal).is_some_and(|o| o != std::cmp::Ordering::Less),
        Op::Lt => numeric_cmp(found, literal).is_some_and(|o| o == std::cmp::Ordering::Less),
        Op::Lte => numeric_cmp(found, literal).is_some_and(|o| o != std::cmp::Ordering::Greater),
        Op::In => literal.as_list().is_some_and(|items| items.iter().any(|v| values_equal(found, v))),
        Op::Nin => !literal.as_list().is_some_and(|items| items.iter().any(|v| values_equal(found, v))),
        Op::Regex => {
            let pattern = literal.as_str().ok_or_else(|| FilterError::InvalidValue {
                field: field.to_string(),
                reason: "regex operator requires a string pattern".into(),
            })?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| FilterError::InvalidRegex { field: field.to_string(), reason: e.to_string() })?;
            found.as_str().is_some_and(|s| re.is_match(s))
        }
        Op::Exists => unreachable!("handled above"),
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    matches!((a, b), (Value::Num(_), _) | (_, Value::Num(_))) && a.as_f64().zip(b.as_f64()).is_some_and(|(x, y)| x == y)
}

fn numeric_cmp(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}
