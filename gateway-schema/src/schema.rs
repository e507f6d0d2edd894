use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::field::{parse_field, FieldType, ParsedField, RelationKind};
use crate::ident::is_valid_identifier;
use crate::model::{pluralize, ParsedModel};

/// Ordered mapping `ModelName → ParsedModel`.
pub type ParsedSchema = IndexMap<String, ParsedModel>;

/// Turn the raw DSL mapping (`ModelName → FieldName → TypeExpression`)
/// into a fully resolved [`ParsedSchema`].
///
/// The resolution pass is idempotent and meant to run once per schema
/// load: it does not mutate anything beyond the freshly built models.
pub fn parse_schema(raw: &IndexMap<String, IndexMap<String, String>>) -> Result<ParsedSchema, SchemaError> {
    let mut schema = ParsedSchema::new();

    for (model_name, raw_fields) in raw {
        if !is_valid_identifier(model_name) {
            return Err(SchemaError::InvalidIdentifier(model_name.clone()));
        }

        let mut id_strategy = None;
        let mut name_field = None;
        let mut fields: IndexMap<String, ParsedField> = IndexMap::new();

        for (field_name, expr) in raw_fields {
            // Keys starting with `$` are model-level metadata, never fields.
            if let Some(meta_key) = field_name.strip_prefix('$') {
                match meta_key {
                    "id" => id_strategy = Some(expr.clone()),
                    "name" => name_field = Some(expr.clone()),
                    _ => {}
                }
                continue;
            }
            if !is_valid_identifier(field_name) {
                return Err(SchemaError::InvalidIdentifier(format!("{model_name}.{field_name}")));
            }
            let parsed = parse_field(field_name, expr)?;
            fields.insert(field_name.clone(), parsed);
        }

        let primary_key = detect_primary_key(&fields);
        if primary_key == "id" && !fields.contains_key("id") {
            fields.insert(
                "id".to_string(),
                synthesize_id_field(),
            );
            // Re-insert at the front so `id` reads first, matching how a
            // declared primary key would normally appear.
            fields.move_index(fields.len() - 1, 0);
        }

        let singular = model_name.to_ascii_lowercase();
        let plural = pluralize(&singular);

        schema.insert(
            model_name.clone(),
            ParsedModel {
                name: model_name.clone(),
                singular,
                plural,
                primary_key,
                fields,
                id_strategy,
                name_field,
            },
        );
    }

    resolve_relations(&schema)?;
    Ok(schema)
}

/// Iterate declared fields in order; the first `cuid`/`uuid` field that is
/// both `required` and `unique` becomes the primary key. Otherwise `id`.
fn detect_primary_key(fields: &IndexMap<String, ParsedField>) -> String {
    for (name, field) in fields {
        if matches!(field.field_type, FieldType::Cuid | FieldType::Uuid) && field.required && field.unique {
            return name.clone();
        }
    }
    "id".to_string()
}

fn synthesize_id_field() -> ParsedField {
    let mut field = parse_field("id", "cuid").expect("static expression parses");
    field.required = true;
    field.unique = true;
    field.indexed = true;
    field
}

fn resolve_relations(schema: &ParsedSchema) -> Result<(), SchemaError> {
    for (model_name, model) in schema {
        for (field_name, field) in &model.fields {
            if let Some(rel) = &field.relation {
                if !schema.contains_key(&rel.target) {
                    return Err(SchemaError::UnresolvedRelation {
                        model: model_name.clone(),
                        field: field_name.clone(),
                        target: rel.target.clone(),
                    });
                }
                if rel.kind == RelationKind::Inverse {
                    // cyclic-safe: referenced by index into the schema map,
                    // never by holding a back-pointer into another model.
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(models: &[(&str, &[(&str, &str)])]) -> IndexMap<String, IndexMap<String, String>> {
        models
            .iter()
            .map(|(name, fields)| {
                let fmap = fields.iter().map(|(f, e)| (f.to_string(), e.to_string())).collect();
                (name.to_string(), fmap)
            })
            .collect()
    }

    #[test]
    fn synthesizes_id_when_absent() {
        let raw = raw(&[("Customer", &[("name", "string!")])]);
        let schema = parse_schema(&raw).unwrap();
        let model = &schema["Customer"];
        assert_eq!(model.primary_key, "id");
        assert!(model.fields.contains_key("id"));
        assert_eq!(model.fields["id"].field_type, FieldType::Cuid);
    }

    #[test]
    fn custom_primary_key_from_unique_required_cuid() {
        let raw = raw(&[("Contact", &[("slug", "cuid!##")])]);
        let schema = parse_schema(&raw).unwrap();
        assert_eq!(schema["Contact"].primary_key, "slug");
        assert!(!schema["Contact"].fields.contains_key("id"));
    }

    #[test]
    fn metadata_keys_are_not_fields() {
        let raw = raw(&[("Article", &[("$id", "cuid"), ("$name", "title"), ("title", "string!")])]);
        let schema = parse_schema(&raw).unwrap();
        let model = &schema["Article"];
        assert!(!model.fields.contains_key("$id"));
        assert!(!model.fields.contains_key("$name"));
        assert_eq!(model.name_field.as_deref(), Some("title"));
    }

    #[test]
    fn invalid_model_identifier_fails() {
        let raw = raw(&[("users; DROP TABLE users--", &[("a", "string")])]);
        assert!(matches!(parse_schema(&raw), Err(SchemaError::InvalidIdentifier(_))));
    }

    #[test]
    fn day_model_pluralises_to_days() {
        let raw = raw(&[("Day", &[("date", "date!")])]);
        let schema = parse_schema(&raw).unwrap();
        assert_eq!(schema["Day"].plural, "days");
    }

    #[test]
    fn unresolved_relation_fails() {
        let raw = raw(&[("Post", &[("author", "-> Ghost")])]);
        assert!(matches!(parse_schema(&raw), Err(SchemaError::UnresolvedRelation { .. })));
    }

    #[test]
    fn resolves_self_referencing_relation() {
        let raw = raw(&[("Employee", &[("manager", "-> Employee"), ("reports", "<- Employee.manager[]")])]);
        let schema = parse_schema(&raw).unwrap();
        assert!(schema.contains_key("Employee"));
    }
}
