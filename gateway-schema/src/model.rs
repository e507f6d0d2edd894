use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::{FieldType, ParsedField};

/// A parsed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedModel {
    pub name: String,
    pub singular: String,
    pub plural: String,
    pub primary_key: String,
    /// Ordered mapping, declaration order preserved.
    pub fields: IndexMap<String, ParsedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,
}

impl ParsedModel {
    pub fn field(&self, name: &str) -> Option<&ParsedField> {
        self.fields.get(name)
    }

    /// String/text fields usable as free-text `search` targets.
    pub fn text_fields(&self) -> impl Iterator<Item = &ParsedField> {
        self.fields
            .values()
            .filter(|f| matches!(f.field_type, FieldType::String | FieldType::Text) && !f.array)
    }
}

/// `Category→categories`, `Address→addresses`, `Box→boxes`,
/// `Branch→branches`, `Wish→wishes`; `{ay,ey,oy,uy}` endings keep `s`
/// (`Day→days`, `Key→keys`); default append `s`.
pub fn pluralize(singular_lower: &str) -> String {
    let s = singular_lower;
    if let Some(stem) = s.strip_suffix('y') {
        let last_two = {
            let len = s.len();
            if len >= 2 { &s[len - 2..] } else { s }
        };
        if matches!(last_two, "ay" | "ey" | "oy" | "uy") {
            return format!("{s}s");
        }
        return format!("{stem}ies");
    }
    if s.ends_with('s') || s.ends_with('x') || s.ends_with("ch") || s.ends_with("sh") {
        return format!("{s}es");
    }
    format!("{s}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralisation_rules() {
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
        assert_eq!(pluralize("wish"), "wishes");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("contact"), "contacts");
    }
}
