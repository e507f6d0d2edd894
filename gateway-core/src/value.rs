use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A tagged, dynamically-typed value.
///
/// The gateway never reaches for `serde_json::Value` or `Record<string,
/// unknown>` directly in its own data model — fields, filter literals, and
/// document payloads all flow through this sum type instead, the same way
/// `gateway-core::config::ConfigValue` tags configuration scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Obj(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Str(s) if s == "true" => Some(true),
            Value::Str(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Str(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Obj(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce a raw query-string token: `"true"`/`"false"`/`"null"` to
    /// their typed forms, a numeric-looking token to [`Value::Num`],
    /// otherwise a plain [`Value::Str`]. Applied after URL-decoding.
    pub fn coerce_token(raw: &str) -> Value {
        match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => {
                if is_numeric_token(raw) {
                    raw.parse::<f64>().map(Value::Num).unwrap_or_else(|_| Value::Str(raw.to_string()))
                } else {
                    Value::Str(raw.to_string())
                }
            }
        }
    }

    /// Render back to the wire form used by canonicalised query strings.
    pub fn to_query_token(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Str(s) => s.clone(),
            Value::List(items) => items.iter().map(Value::to_query_token).collect::<Vec<_>>().join(","),
            Value::Obj(_) => String::new(),
        }
    }
}

/// `^-?\d+(\.\d+)?$` without pulling in `regex` for a one-off check.
fn is_numeric_token(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut idx = 0;
    if bytes[0] == b'-' {
        idx += 1;
    }
    if idx >= bytes.len() {
        return false;
    }
    let mut saw_digit = false;
    let mut saw_dot = false;
    while idx < bytes.len() {
        match bytes[idx] {
            b'0'..=b'9' => saw_digit = true,
            b'.' if !saw_dot => saw_dot = true,
            _ => return false,
        }
        idx += 1;
    }
    saw_digit
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Num(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Obj(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Num(n) => Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s),
            Value::List(items) => serde_json::Value::Array(items.into_iter().map(Into::into).collect()),
            Value::Obj(map) => {
                serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_booleans_and_null() {
        assert_eq!(Value::coerce_token("true"), Value::Bool(true));
        assert_eq!(Value::coerce_token("false"), Value::Bool(false));
        assert_eq!(Value::coerce_token("null"), Value::Null);
    }

    #[test]
    fn coerces_numeric_tokens() {
        assert_eq!(Value::coerce_token("10000"), Value::Num(10000.0));
        assert_eq!(Value::coerce_token("-3.5"), Value::Num(-3.5));
        assert_eq!(Value::coerce_token("tools"), Value::Str("tools".to_string()));
        // leading-digit-but-not-pure-numeric strings stay strings
        assert_eq!(Value::coerce_token("10000-a"), Value::Str("10000-a".to_string()));
    }

    #[test]
    fn round_trips_through_json() {
        let v = Value::Obj(BTreeMap::from([
            ("a".to_string(), Value::Num(1.0)),
            ("b".to_string(), Value::List(vec![Value::Bool(true), Value::Null])),
        ]));
        let json: serde_json::Value = v.clone().into();
        let back: Value = json.into();
        assert_eq!(v, back);
    }
}
