use serde_json::{json, Map, Value};

use gateway_schema::{FieldType, Format, ParsedField, ParsedModel, RelationKind};

/// Build a JSON-Schema-ish document describing `model`, the same way
/// `r2e-openapi`'s builder assembles raw `serde_json::Value` schema
/// objects rather than deriving them from a static Rust type — the model
/// graph here is data, not a compile-time struct, so there's nothing for
/// a derive macro to attach to.
pub fn build_json_schema(model: &ParsedModel) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, field) in &model.fields {
        properties.insert(name.clone(), field_schema(field));
        if field.required && name != &model.primary_key {
            required.push(Value::String(name.clone()));
        }
    }

    let mut schema = json!({
        "type": "object",
        "title": model.name,
        "properties": properties,
    });
    if !required.is_empty() {
        schema.as_object_mut().unwrap().insert("required".to_string(), Value::Array(required));
    }
    schema
}

fn field_schema(field: &ParsedField) -> Value {
    let base = scalar_schema(field);
    let wrapped = if field.array { json!({ "type": "array", "items": base }) } else { base };
    let mut obj = wrapped.as_object().cloned().unwrap_or_default();
    if let Some(default) = &field.default {
        obj.insert("default".to_string(), default.clone().into());
    }
    Value::Object(obj)
}

fn scalar_schema(field: &ParsedField) -> Value {
    if let Some(values) = &field.enum_values {
        return json!({ "type": "string", "enum": values });
    }

    match field.field_type {
        FieldType::String => match field.format {
            Some(Format::Url) => json!({ "type": "string", "format": "uri" }),
            Some(Format::Email) => json!({ "type": "string", "format": "email" }),
            Some(Format::Markdown) => json!({ "type": "string" }),
            Some(Format::Slug) => json!({ "type": "string", "pattern": "^[a-z0-9]+(-[a-z0-9]+)*$" }),
            None => json!({ "type": "string" }),
        },
        FieldType::Text => json!({ "type": "string" }),
        FieldType::Number => {
            let mut obj = Map::new();
            obj.insert("type".to_string(), json!("number"));
            if let (Some(precision), Some(scale)) = (field.precision, field.scale) {
                obj.insert("x-precision".to_string(), json!(precision));
                obj.insert("x-scale".to_string(), json!(scale));
            }
            Value::Object(obj)
        }
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::Json => json!({ "type": "object" }),
        FieldType::Timestamp => json!({ "type": "string", "format": "date-time" }),
        FieldType::Date => json!({ "type": "string", "format": "date" }),
        FieldType::Cuid | FieldType::Uuid => json!({ "type": "string" }),
        FieldType::Vector => json!({
            "type": "array",
            "items": { "type": "number" },
            "minItems": field.vector_dimensions,
            "maxItems": field.vector_dimensions,
        }),
        FieldType::Relation => {
            let relation = field.relation.as_ref().expect("relation field always carries RelationInfo");
            let item = json!({ "type": "string" });
            if relation.many || relation.kind == RelationKind::Inverse {
                json!({ "type": "array", "items": item })
            } else {
                item
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_schema::parse_schema;
    use indexmap::IndexMap;

    fn model(fields: &[(&str, &str)]) -> ParsedModel {
        let raw: IndexMap<String, IndexMap<String, String>> = [(
            "Contact".to_string(),
            fields.iter().map(|(n, e)| (n.to_string(), e.to_string())).collect(),
        )]
        .into_iter()
        .collect();
        parse_schema(&raw).unwrap().shift_remove("Contact").unwrap()
    }

    #[test]
    fn required_excludes_primary_key() {
        let m = model(&[("name", "string!")]);
        let schema = build_json_schema(&m);
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&Value::String("name".to_string())));
        assert!(!required.contains(&Value::String("id".to_string())));
    }

    #[test]
    fn enum_field_becomes_string_enum() {
        let m = model(&[("tier", r#"Lead | Qualified | Customer"#)]);
        let schema = build_json_schema(&m);
        assert_eq!(schema["properties"]["tier"]["enum"], json!(["Lead", "Qualified", "Customer"]));
    }

    #[test]
    fn array_field_wraps_items() {
        let m = model(&[("tags", "string[]")]);
        let schema = build_json_schema(&m);
        assert_eq!(schema["properties"]["tags"]["type"], json!("array"));
        assert_eq!(schema["properties"]["tags"]["items"]["type"], json!("string"));
    }

    #[test]
    fn vector_field_has_fixed_length() {
        let m = model(&[("embedding", "vector[1536]")]);
        let schema = build_json_schema(&m);
        assert_eq!(schema["properties"]["embedding"]["minItems"], json!(1536));
        assert_eq!(schema["properties"]["embedding"]["maxItems"], json!(1536));
    }

    #[test]
    fn default_value_is_surfaced() {
        let m = model(&[("mrr", "number = 0")]);
        let schema = build_json_schema(&m);
        assert_eq!(schema["properties"]["mrr"]["default"], json!(0.0));
    }
}
