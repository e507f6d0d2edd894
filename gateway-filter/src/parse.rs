use gateway_core::Value;

use crate::ast::{FilterAst, Op};
use crate::error::FilterError;

/// Query parameters consumed by pagination, projection and transport
/// concerns rather than by the filter itself. Recognised here purely so
/// they're skipped instead of mistaken for filter fields.
pub const RESERVED_PARAMS: &[&str] = &[
    "page", "limit", "offset", "after", "before", "cursor", "sort", "q", "include", "depth",
    "distinct", "count", "debug", "format", "raw", "stream", "domains", "array",
];

/// The result of parsing a request's query string: the filter expression
/// plus the projection lists, which share the same `key=a,b,c` shape but
/// aren't part of the filter AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub filter: FilterAst,
    pub fields: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

/// A field comparison before operator-specific value handling (splitting
/// `in`/`between` lists, escaping `contains`/`ends`, …) has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Regex,
    Exists,
    Contains,
    Starts,
    Ends,
    Between,
}

/// Parse a raw (still percent-encoded) query string into a filter AST and
/// the `fields`/`exclude` projection lists.
///
/// Every non-reserved parameter becomes one leaf; multiple parameters are
/// implicitly ANDed together, matching ordinary REST query-string
/// semantics (`?status=active&age.gt=18` means both).
pub fn parse_query(raw: &str) -> Result<ParsedQuery, FilterError> {
    let mut leaves = Vec::new();
    let mut fields = None;
    let mut exclude = None;

    for segment in raw.split('&').filter(|s| !s.is_empty()) {
        let decoded = decode_component(segment);

        if let Some(value) = decoded.strip_prefix("fields=") {
            fields = Some(split_csv(value));
            continue;
        }
        if let Some(value) = decoded.strip_prefix("exclude=") {
            exclude = Some(split_csv(value));
            continue;
        }
        if is_reserved(&decoded) {
            continue;
        }

        let (field, raw_op, value_raw, bare) = extract_field_op_value(&decoded)?;
        validate_field(&field)?;
        leaves.extend(build_leaves(&field, raw_op, &value_raw, bare)?);
    }

    Ok(ParsedQuery { filter: FilterAst::And(leaves), fields, exclude })
}

/// Parse a single value already split out of the query string (field name
/// and raw token known ahead of time), used by callers that have already
/// done their own tokenising (e.g. a framework's `Query<HashMap<..>>`
/// extractor). Reserved params are the caller's responsibility to skip.
pub fn parse_param(key: &str, value: &str) -> Result<Vec<FilterAst>, FilterError> {
    let (field, raw_op, value_raw, bare) = extract_field_op_value(&format!("{key}={value}"))?;
    validate_field(&field)?;
    build_leaves(&field, raw_op, &value_raw, bare)
}

fn is_reserved(decoded: &str) -> bool {
    let key = decoded.split('=').next().unwrap_or(decoded);
    RESERVED_PARAMS.contains(&key)
}

fn split_csv(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

/// Extract `(field, operator, raw value, was the key a bare field with no
/// operator token at all)` from one decoded `key=value` (or, for the
/// symbolic-no-`=` forms, bare `field>value`) segment.
fn extract_field_op_value(decoded: &str) -> Result<(String, RawOp, String, bool), FilterError> {
    if let Some(eq_pos) = decoded.find('=') {
        let key_raw = &decoded[..eq_pos];
        let value_raw = &decoded[eq_pos + 1..];

        if let Some(field) = key_raw.strip_suffix('!') {
            return Ok((field.to_string(), RawOp::Ne, value_raw.to_string(), false));
        }
        if let Some(field) = key_raw.strip_suffix('>') {
            return Ok((field.to_string(), RawOp::Gte, value_raw.to_string(), false));
        }
        if let Some(field) = key_raw.strip_suffix('<') {
            return Ok((field.to_string(), RawOp::Lte, value_raw.to_string(), false));
        }
        if key_raw.ends_with(']') {
            if let Some(open) = key_raw.find("[$") {
                let field = &key_raw[..open];
                let token = &key_raw[open + 2..key_raw.len() - 1];
                let op = bracket_op(token)
                    .ok_or_else(|| FilterError::UnknownOperator { field: field.to_string(), op: token.to_string() })?;
                return Ok((field.to_string(), op, value_raw.to_string(), false));
            }
        }
        if let Some(dot) = key_raw.rfind('.') {
            let field = &key_raw[..dot];
            let token = &key_raw[dot + 1..];
            if let Some(op) = dot_suffix_op(token) {
                return Ok((field.to_string(), op, value_raw.to_string(), false));
            }
        }

        let has_comma = value_raw.contains(',');
        let op = if has_comma { RawOp::In } else { RawOp::Eq };
        return Ok((key_raw.to_string(), op, value_raw.to_string(), true));
    }

    for (ch, op) in [('>', RawOp::Gt), ('<', RawOp::Lt), ('~', RawOp::Regex)] {
        if let Some(idx) = decoded.find(ch) {
            let field = &decoded[..idx];
            let value = &decoded[idx + ch.len_utf8()..];
            return Ok((field.to_string(), op, value.to_string(), false));
        }
    }

    Ok((decoded.to_string(), RawOp::Exists, "true".to_string(), false))
}

fn dot_suffix_op(token: &str) -> Option<RawOp> {
    Some(match token {
        "eq" => RawOp::Eq,
        "ne" | "not" => RawOp::Ne,
        "gt" => RawOp::Gt,
        "gte" => RawOp::Gte,
        "lt" => RawOp::Lt,
        "lte" => RawOp::Lte,
        "in" => RawOp::In,
        "nin" => RawOp::Nin,
        "regex" => RawOp::Regex,
        "exists" => RawOp::Exists,
        "contains" => RawOp::Contains,
        "starts" => RawOp::Starts,
        "ends" => RawOp::Ends,
        "between" => RawOp::Between,
        _ => return None,
    })
}

fn bracket_op(token: &str) -> Option<RawOp> {
    Some(match token {
        "eq" => RawOp::Eq,
        "ne" => RawOp::Ne,
        "gt" => RawOp::Gt,
        "gte" => RawOp::Gte,
        "lt" => RawOp::Lt,
        "lte" => RawOp::Lte,
        "in" => RawOp::In,
        "nin" => RawOp::Nin,
        "regex" => RawOp::Regex,
        "exists" => RawOp::Exists,
        _ => return None,
    })
}

fn build_leaves(field: &str, op: RawOp, raw_value: &str, _bare: bool) -> Result<Vec<FilterAst>, FilterError> {
    let leaf = |op: Op, value: Value| FilterAst::leaf(field, op, value);

    let leaves = match op {
        RawOp::Eq => vec![leaf(Op::Eq, Value::coerce_token(raw_value))],
        RawOp::Ne => vec![leaf(Op::Ne, Value::coerce_token(raw_value))],
        RawOp::Gt => vec![leaf(Op::Gt, Value::coerce_token(raw_value))],
        RawOp::Gte => vec![leaf(Op::Gte, Value::coerce_token(raw_value))],
        RawOp::Lt => vec![leaf(Op::Lt, Value::coerce_token(raw_value))],
        RawOp::Lte => vec![leaf(Op::Lte, Value::coerce_token(raw_value))],
        RawOp::In => vec![leaf(Op::In, coerce_list(raw_value))],
        RawOp::Nin => vec![leaf(Op::Nin, coerce_list(raw_value))],
        RawOp::Regex => {
            regex::Regex::new(raw_value)
                .map_err(|e| FilterError::InvalidRegex { field: field.to_string(), reason: e.to_string() })?;
            vec![leaf(Op::Regex, Value::Str(raw_value.to_string()))]
        }
        RawOp::Exists => vec![leaf(Op::Exists, Value::Bool(Value::coerce_token(raw_value).as_bool().unwrap_or(true)))],
        RawOp::Contains => vec![leaf(Op::Regex, Value::Str(format!("(?i){}", regex::escape(raw_value))))],
        RawOp::Starts => vec![leaf(Op::Regex, Value::Str(format!("^{raw_value}")))],
        RawOp::Ends => vec![leaf(Op::Regex, Value::Str(format!("{}$", regex::escape(raw_value))))],
        RawOp::Between => {
            let mut parts = raw_value.splitn(2, ',');
            let lo = parts.next().unwrap_or_default();
            let hi = parts
                .next()
                .ok_or_else(|| FilterError::InvalidValue { field: field.to_string(), reason: "between requires two comma-separated bounds".into() })?;
            vec![leaf(Op::Gte, Value::coerce_token(lo)), leaf(Op::Lte, Value::coerce_token(hi))]
        }
    };
    Ok(leaves)
}

fn coerce_list(raw: &str) -> Value {
    let tokens: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    let all_numeric = !tokens.is_empty() && tokens.iter().all(|t| t.parse::<f64>().is_ok());
    if all_numeric {
        Value::List(tokens.iter().map(|t| Value::Num(t.parse().unwrap())).collect())
    } else {
        Value::List(tokens.iter().map(|t| Value::Str((*t).to_string())).collect())
    }
}

fn validate_field(field: &str) -> Result<(), FilterError> {
    let mut chars = field.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if ok && !field.is_empty() {
        Ok(())
    } else {
        Err(FilterError::InvalidField(field.to_string()))
    }
}

fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let Ok(byte) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
