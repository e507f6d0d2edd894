use std::collections::BTreeMap;

use gateway_core::Value;
use gateway_schema::{FieldType, ParsedField, ParsedModel};

use crate::error::ValidationErrors;

/// Validate `doc` against `model`.
///
/// In `partial` mode (used for `PATCH`/update requests) missing required
/// fields are not an error — only fields that *are* present are
/// type-checked. In full mode every required field (excluding the
/// primary key, which the storage adapter assigns) must be present and
/// non-null.
pub fn validate_document(model: &ParsedModel, doc: &BTreeMap<String, Value>, partial: bool) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if !partial {
        for (name, field) in &model.fields {
            if name == &model.primary_key || !field.required {
                continue;
            }
            match doc.get(name) {
                None | Some(Value::Null) => errors.push(name, "is required"),
                _ => {}
            }
        }
    }

    for (name, value) in doc {
        let Some(field) = model.field(name) else { continue };
        if value.is_null() {
            continue;
        }
        if let Err(message) = check_type(field, value) {
            errors.push(name, message);
        }
    }

    errors
}

fn check_type(field: &ParsedField, value: &Value) -> Result<(), String> {
    if field.array {
        let items = value.as_list().ok_or("must be an array")?;
        for item in items {
            check_scalar(field, item)?;
        }
        return Ok(());
    }
    check_scalar(field, value)
}

fn check_scalar(field: &ParsedField, value: &Value) -> Result<(), String> {
    if let Some(values) = &field.enum_values {
        let s = value.as_str().ok_or("must be a string")?;
        return if values.iter().any(|v| v == s) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", values.join(", ")))
        };
    }

    match field.field_type {
        FieldType::String | FieldType::Text | FieldType::Cuid | FieldType::Uuid | FieldType::Timestamp | FieldType::Date => {
            value.as_str().map(|_| ()).ok_or_else(|| "must be a string".to_string())
        }
        FieldType::Number => value.as_f64().map(|_| ()).ok_or_else(|| "must be a number".to_string()),
        FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(|| "must be a boolean".to_string()),
        FieldType::Json => match value {
            Value::Obj(_) => Ok(()),
            _ => Err("must be an object".to_string()),
        },
        FieldType::Relation => match value {
            Value::Str(_) | Value::List(_) => Ok(()),
            _ => Err("must be an id or a list of ids".to_string()),
        },
        FieldType::Vector => {
            let items = value.as_list().ok_or("must be an array of numbers")?;
            if items.iter().any(|v| v.as_f64().is_none()) {
                return Err("must be an array of numbers".to_string());
            }
            if let Some(dims) = field.vector_dimensions {
                if items.len() != dims {
                    return Err(format!("must have exactly {dims} dimensions"));
                }
            }
            Ok(())
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

    fn doc(pairs: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn missing_required_field_fails_full_validation() {
        let m = model(&[("name", "string!")]);
        let errors = validate_document(&m, &doc(vec![]), false);
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "name");
    }

    #[test]
    fn partial_validation_ignores_missing_required() {
        let m = model(&[("name", "string!")]);
        let errors = validate_document(&m, &doc(vec![]), true);
        assert!(errors.is_empty());
    }

    #[test]
    fn wrong_type_fails_in_both_modes() {
        let m = model(&[("age", "number")]);
        let errors = validate_document(&m, &doc(vec![("age", Value::Str("old".into()))]), true);
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn enum_value_must_be_one_of_declared() {
        let m = model(&[("tier", r#"Lead | Qualified"#)]);
        let errors = validate_document(&m, &doc(vec![("tier", Value::Str("Bogus".into()))]), true);
        assert_eq!(errors.0.len(), 1);
        let ok = validate_document(&m, &doc(vec![("tier", Value::Str("Lead".into()))]), true);
        assert!(ok.is_empty());
    }

    #[test]
    fn vector_dimension_mismatch_fails() {
        let m = model(&[("embedding", "vector[3]")]);
        let errors = validate_document(&m, &doc(vec![("embedding", Value::List(vec![Value::Num(1.0), Value::Num(2.0)]))]), true);
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let m = model(&[("name", "string!")]);
        let errors = validate_document(&m, &doc(vec![("name", Value::Str("a".into())), ("mystery", Value::Bool(true))]), false);
        assert!(errors.is_empty());
    }
}
