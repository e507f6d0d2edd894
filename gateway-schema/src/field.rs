use gateway_core::Value;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Json,
    Text,
    Timestamp,
    Date,
    Cuid,
    Uuid,
    Relation,
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Url,
    Email,
    Markdown,
    Slug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Forward,
    Inverse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationInfo {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub target: String,
    pub many: bool,
    #[serde(rename = "inverseField", skip_serializing_if = "Option::is_none")]
    pub inverse_field: Option<String>,
}

/// A single column's semantics, the output of parsing one DSL type
/// expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub unique: bool,
    pub indexed: bool,
    pub default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationInfo>,
}

struct Modifiers {
    required: Option<bool>,
    unique: bool,
    indexed: bool,
}

/// Parse one field's DSL type expression (`"string!"`, `"-> User.posts[]"`,
/// `"Lead | Qualified | Customer"`, `"decimal(15,2)"`, `"vector[1536]"`, …).
pub fn parse_field(name: &str, expr: &str) -> Result<ParsedField, SchemaError> {
    let (core_and_mods, default) = split_default(expr.trim());
    let (core, mods) = strip_modifiers(core_and_mods.trim());
    let core = core.trim();

    let mut field = build_core(name, core)?;

    field.required = mods.required.unwrap_or(false);
    field.unique = mods.unique || field.unique;
    field.indexed = mods.indexed || field.indexed;
    field.default = default;

    // Invariant: a default value implies required=false.
    if field.default.is_some() {
        field.required = false;
    }
    // Invariant: required=false when relation.type=inverse.
    if let Some(rel) = &field.relation {
        if rel.kind == RelationKind::Inverse {
            field.required = false;
        }
        // Forward relations are always indexed; inverse are never required.
        field.indexed = true;
    }
    if field.vector_dimensions.is_some() {
        field.indexed = true;
    }
    if field.unique {
        field.indexed = true;
    }

    Ok(field)
}

fn split_default(expr: &str) -> (&str, Option<Value>) {
    // The only `=` in a field expression separates core+modifiers from the
    // default literal; arrows (`->`/`<-`) never contain `=`.
    match expr.find('=') {
        Some(idx) => {
            let (core, rest) = expr.split_at(idx);
            let literal = rest[1..].trim();
            (core, Some(parse_literal(literal)))
        }
        None => (expr, None),
    }
}

fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    if raw == "true" {
        return Value::Bool(true);
    }
    if raw == "false" {
        return Value::Bool(false);
    }
    if raw == "null" {
        return Value::Null;
    }
    if (raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2)
        || (raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2)
    {
        return Value::Str(raw[1..raw.len() - 1].to_string());
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::Num(n);
    }
    Value::Str(raw.to_string())
}

fn strip_modifiers(mut s: &str) -> (&str, Modifiers) {
    let mut required = None;
    let mut unique = false;
    let mut indexed = false;
    loop {
        s = s.trim_end();
        if let Some(stripped) = strip_suffix_word(s, "#unique") {
            unique = true;
            indexed = true;
            s = stripped;
        } else if let Some(stripped) = strip_suffix_word(s, "#index") {
            indexed = true;
            s = stripped;
        } else if let Some(stripped) = s.strip_suffix("##") {
            unique = true;
            indexed = true;
            s = stripped;
        } else if let Some(stripped) = s.strip_suffix('#') {
            indexed = true;
            s = stripped;
        } else if let Some(stripped) = s.strip_suffix('!') {
            required = Some(true);
            s = stripped;
        } else if let Some(stripped) = s.strip_suffix('?') {
            required = Some(false);
            s = stripped;
        } else {
            break;
        }
    }
    (s, Modifiers { required, unique, indexed })
}

/// Strip a trailing word-modifier like `#unique`/`#index`, requiring it
/// either be the whole string or preceded by whitespace — `"string#index"`
/// and `"string #index"` both match, but a base type that merely ends in
/// the same letters does not.
fn strip_suffix_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let stripped = s.strip_suffix(word)?;
    if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
        Some(stripped.trim_end())
    } else {
        None
    }
}

fn base_field(name: &str, field_type: FieldType) -> ParsedField {
    ParsedField {
        name: name.to_string(),
        field_type,
        required: false,
        unique: false,
        indexed: false,
        default: None,
        enum_values: None,
        format: None,
        precision: None,
        scale: None,
        array: false,
        vector_dimensions: None,
        relation: None,
    }
}

fn build_core(name: &str, core: &str) -> Result<ParsedField, SchemaError> {
    // Relation: `->` forward, `<-` inverse.
    if let Some(rest) = core.strip_prefix("->").or_else(|| core.strip_prefix("<-")) {
        let kind = if core.starts_with("->") { RelationKind::Forward } else { RelationKind::Inverse };
        let mut rest = rest.trim();
        let many = if let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped.trim_end();
            true
        } else {
            false
        };
        let (target, inverse_field) = match rest.split_once('.') {
            Some((t, f)) => (t.trim().to_string(), Some(f.trim().to_string())),
            None => (rest.trim().to_string(), None),
        };
        if target.is_empty() {
            return Err(SchemaError::InvalidIdentifier(format!("relation target missing for field {name}")));
        }
        let mut field = base_field(name, FieldType::Relation);
        field.relation = Some(RelationInfo { kind, target, many, inverse_field });
        return Ok(field);
    }

    // vector[N]
    let lower = core.to_ascii_lowercase();
    if lower.starts_with("vector[") && lower.ends_with(']') {
        let inner = &core[7..core.len() - 1];
        let dims: usize = inner
            .trim()
            .parse()
            .map_err(|_| SchemaError::InvalidIdentifier(format!("invalid vector dimensions in field {name}: {inner}")))?;
        if dims == 0 {
            return Err(SchemaError::InvalidIdentifier(format!("vector dimensions must be > 0 for field {name}")));
        }
        let mut field = base_field(name, FieldType::Vector);
        field.vector_dimensions = Some(dims);
        return Ok(field);
    }

    // decimal(p, s)
    if lower.starts_with("decimal(") && core.ends_with(')') {
        let inner = &core[8..core.len() - 1];
        let mut parts = inner.split(',').map(|p| p.trim());
        let precision = parts.next().and_then(|p| p.parse::<u32>().ok());
        let scale = parts.next().and_then(|p| p.parse::<u32>().ok());
        let (precision, scale) = match (precision, scale) {
            (Some(p), Some(s)) => (p, s),
            _ => return Err(SchemaError::InvalidIdentifier(format!("invalid decimal(p,s) in field {name}"))),
        };
        let mut field = base_field(name, FieldType::Number);
        field.precision = Some(precision);
        field.scale = Some(scale);
        return Ok(field);
    }

    // enum(a, b, c)
    if lower.starts_with("enum(") && core.ends_with(')') {
        let inner = &core[5..core.len() - 1];
        let values: Vec<String> = inner.split(',').map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string()).collect();
        let mut field = base_field(name, FieldType::String);
        field.enum_values = Some(values);
        return Ok(field);
    }

    // pipe-separated enum: `Lead | Qualified | Customer`
    if core.contains('|') {
        let values: Vec<String> = core.split('|').map(|v| v.trim().to_string()).collect();
        let mut field = base_field(name, FieldType::String);
        field.enum_values = Some(values);
        return Ok(field);
    }

    // array type: `ident[]`
    if let Some(inner) = core.strip_suffix("[]") {
        let mut field = map_base_type(name, inner.trim())?;
        field.array = true;
        return Ok(field);
    }

    map_base_type(name, core)
}

fn map_base_type(name: &str, token: &str) -> Result<ParsedField, SchemaError> {
    let lower = token.to_ascii_lowercase();
    let (field_type, format) = match lower.as_str() {
        "int" | "integer" | "float" | "number" => (FieldType::Number, None),
        "bool" | "boolean" => (FieldType::Boolean, None),
        "object" | "json" => (FieldType::Json, None),
        "datetime" | "timestamp" => (FieldType::Timestamp, None),
        "date" => (FieldType::Date, None),
        "id" | "cuid" => (FieldType::Cuid, None),
        "uuid" => (FieldType::Uuid, None),
        "text" => (FieldType::Text, None),
        "url" => (FieldType::String, Some(Format::Url)),
        "email" => (FieldType::String, Some(Format::Email)),
        "markdown" => (FieldType::String, Some(Format::Markdown)),
        "slug" => (FieldType::String, Some(Format::Slug)),
        "string" => (FieldType::String, None),
        // Unknown base type tokens degrade to plain string.
        _ => (FieldType::String, None),
    };
    let mut field = base_field(name, field_type);
    field.format = format;
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_string() {
        let f = parse_field("name", "string!").unwrap();
        assert_eq!(f.field_type, FieldType::String);
        assert!(f.required);
    }

    #[test]
    fn email_format() {
        let f = parse_field("email", "email!").unwrap();
        assert_eq!(f.field_type, FieldType::String);
        assert_eq!(f.format, Some(Format::Email));
        assert!(f.required);
    }

    #[test]
    fn forward_relation_with_inverse_field_and_many() {
        let f = parse_field("posts", "-> User.posts[]").unwrap();
        let rel = f.relation.unwrap();
        assert_eq!(rel.kind, RelationKind::Forward);
        assert_eq!(rel.target, "User");
        assert_eq!(rel.inverse_field.as_deref(), Some("posts"));
        assert!(rel.many);
        assert!(f.indexed);
    }

    #[test]
    fn inverse_relation_never_required() {
        let f = parse_field("author", "<- User.posts!").unwrap();
        let rel = f.relation.unwrap();
        assert_eq!(rel.kind, RelationKind::Inverse);
        assert!(!f.required);
    }

    #[test]
    fn pipe_enum_with_default() {
        let f = parse_field("tier", r#"Lead | Qualified | Customer = "Lead""#).unwrap();
        assert_eq!(f.enum_values, Some(vec!["Lead".to_string(), "Qualified".to_string(), "Customer".to_string()]));
        assert_eq!(f.default, Some(Value::Str("Lead".to_string())));
        assert!(!f.required);
    }

    #[test]
    fn decimal_type() {
        let f = parse_field("amount", "decimal(15,2)").unwrap();
        assert_eq!(f.field_type, FieldType::Number);
        assert_eq!(f.precision, Some(15));
        assert_eq!(f.scale, Some(2));
    }

    #[test]
    fn vector_type_is_indexed() {
        let f = parse_field("embedding", "vector[1536]").unwrap();
        assert_eq!(f.field_type, FieldType::Vector);
        assert_eq!(f.vector_dimensions, Some(1536));
        assert!(f.indexed);
    }

    #[test]
    fn unique_shorthand_implies_indexed() {
        let f = parse_field("slug", "string##").unwrap();
        assert!(f.unique);
        assert!(f.indexed);
    }

    #[test]
    fn numeric_default_disables_required() {
        let f = parse_field("mrr", "number = 0").unwrap();
        assert_eq!(f.default, Some(Value::Num(0.0)));
        assert!(!f.required);
    }

    #[test]
    fn array_type() {
        let f = parse_field("tags", "string[]").unwrap();
        assert!(f.array);
        assert_eq!(f.field_type, FieldType::String);
    }

    #[test]
    fn unknown_base_type_degrades_to_string() {
        let f = parse_field("weird", "frobnicator").unwrap();
        assert_eq!(f.field_type, FieldType::String);
    }
}
