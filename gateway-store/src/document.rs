use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gateway_core::Value;

/// The canonical (unprefixed) meta field names, in the order they're
/// rendered on the wire. Any of these appearing in a create/update input
/// bag is a meta instruction rather than a user field — see
/// [`partition_meta`].
pub const META_FIELDS: &[&str] = &[
    "id",
    "type",
    "version",
    "createdAt",
    "updatedAt",
    "createdBy",
    "updatedBy",
    "deletedAt",
    "deletedBy",
    "context",
];

/// The system side of a document: everything the `Store` is sole
/// authority over. Kept as a typed struct rather than prefixed string
/// keys in a map, per the tagged-union re-architecture — `Document`
/// never confuses "the field happens to be named `_version`" with "this
/// is the version meta field".
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub id: String,
    pub doc_type: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub context: Option<Value>,
}

impl Meta {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// The internal entity shape: typed meta plus a free-form user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub meta: Meta,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn is_deleted(&self) -> bool {
        self.meta.is_deleted()
    }

    /// A flat view with the bare (unprefixed) meta fields merged alongside
    /// `fields` — the shape the filter matcher and sort comparator expect
    /// (they operate on a plain `BTreeMap<String, Value>` with no notion of
    /// a separate meta struct), and lets a filter or sort reference `id`,
    /// `createdAt`, etc. the same way it references any user field.
    pub fn as_matchable(&self) -> BTreeMap<String, Value> {
        let mut out = self.fields.clone();
        out.insert("id".to_string(), Value::Str(self.meta.id.clone()));
        out.insert("type".to_string(), Value::Str(self.meta.doc_type.clone()));
        out.insert("version".to_string(), Value::Num(self.meta.version as f64));
        out.insert("createdAt".to_string(), Value::Str(self.meta.created_at.to_rfc3339()));
        out.insert("updatedAt".to_string(), Value::Str(self.meta.updated_at.to_rfc3339()));
        if let Some(by) = &self.meta.created_by {
            out.insert("createdBy".to_string(), Value::Str(by.clone()));
        }
        if let Some(by) = &self.meta.updated_by {
            out.insert("updatedBy".to_string(), Value::Str(by.clone()));
        }
        out
    }
}

/// Render the document's external, client-facing form: meta fields under
/// `prefix` (`"$"` by default, `"_"` for the legacy convention), user
/// fields at the top level. One pass, no intermediate map — the
/// counterpart to [`entity_to_document`]'s internal encoding.
pub fn format_entity(doc: &Document, prefix: &str) -> Value {
    let mut out = doc.fields.clone();
    out.insert(format!("{prefix}id"), Value::Str(doc.meta.id.clone()));
    out.insert(format!("{prefix}type"), Value::Str(doc.meta.doc_type.clone()));
    out.insert(format!("{prefix}version"), Value::Num(doc.meta.version as f64));
    out.insert(format!("{prefix}createdAt"), Value::Str(doc.meta.created_at.to_rfc3339()));
    out.insert(format!("{prefix}updatedAt"), Value::Str(doc.meta.updated_at.to_rfc3339()));
    if let Some(by) = &doc.meta.created_by {
        out.insert(format!("{prefix}createdBy"), Value::Str(by.clone()));
    }
    if let Some(by) = &doc.meta.updated_by {
        out.insert(format!("{prefix}updatedBy"), Value::Str(by.clone()));
    }
    if let Some(at) = &doc.meta.deleted_at {
        out.insert(format!("{prefix}deletedAt"), Value::Str(at.to_rfc3339()));
    }
    if let Some(by) = &doc.meta.deleted_by {
        out.insert(format!("{prefix}deletedBy"), Value::Str(by.clone()));
    }
    if let Some(ctx) = &doc.meta.context {
        out.insert(format!("{prefix}context"), ctx.clone());
    }
    Value::Obj(out)
}

/// Split a create/update input bag into (meta overrides, user fields).
/// Keys matching [`META_FIELDS`] are meta instructions; everything else
/// is a user field. Called only after the storage adapter has already
/// stripped client-supplied `$`/`_`-prefixed system fields and re-added
/// its own authoritative bare-keyed overrides, so by the time this runs
/// every meta-named key present is one the adapter put there on purpose.
pub fn partition_meta(mut data: BTreeMap<String, Value>) -> (BTreeMap<String, Value>, BTreeMap<String, Value>) {
    let mut meta = BTreeMap::new();
    for key in META_FIELDS {
        if let Some(v) = data.remove(*key) {
            meta.insert(key.to_string(), v);
        }
    }
    (meta, data)
}

/// Render the document's internal form with `_`-prefixed meta keys
/// merged alongside the user fields at the top level — the legacy
/// internal encoding some stores persist to, distinct from the
/// client-facing [`format_entity`] shape.
pub fn entity_to_document(doc: &Document) -> BTreeMap<String, Value> {
    let mut out = doc.fields.clone();
    out.insert("_id".to_string(), Value::Str(doc.meta.id.clone()));
    out.insert("_type".to_string(), Value::Str(doc.meta.doc_type.clone()));
    out.insert("_version".to_string(), Value::Num(doc.meta.version as f64));
    out.insert("_createdAt".to_string(), Value::Str(doc.meta.created_at.to_rfc3339()));
    out.insert("_updatedAt".to_string(), Value::Str(doc.meta.updated_at.to_rfc3339()));
    if let Some(by) = &doc.meta.created_by {
        out.insert("_createdBy".to_string(), Value::Str(by.clone()));
    }
    if let Some(by) = &doc.meta.updated_by {
        out.insert("_updatedBy".to_string(), Value::Str(by.clone()));
    }
    if let Some(at) = &doc.meta.deleted_at {
        out.insert("_deletedAt".to_string(), Value::Str(at.to_rfc3339()));
    }
    if let Some(by) = &doc.meta.deleted_by {
        out.insert("_deletedBy".to_string(), Value::Str(by.clone()));
    }
    if let Some(ctx) = &doc.meta.context {
        out.insert("_context".to_string(), ctx.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta() -> Meta {
        let now = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        Meta {
            id: "cust_1".into(),
            doc_type: "Customer".into(),
            version: 1,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
            context: None,
        }
    }

    #[test]
    fn partition_splits_meta_from_fields() {
        let mut data = BTreeMap::new();
        data.insert("id".to_string(), Value::Str("cust_1".into()));
        data.insert("version".to_string(), Value::Num(1.0));
        data.insert("name".to_string(), Value::Str("Acme".into()));
        let (meta, fields) = partition_meta(data);
        assert_eq!(meta.get("id"), Some(&Value::Str("cust_1".into())));
        assert_eq!(fields.get("name"), Some(&Value::Str("Acme".into())));
        assert!(!fields.contains_key("id"));
    }

    #[test]
    fn as_matchable_merges_bare_meta() {
        let doc = Document { meta: sample_meta(), fields: BTreeMap::from([("name".to_string(), Value::Str("Acme".into()))]) };
        let m = doc.as_matchable();
        assert_eq!(m.get("id"), Some(&Value::Str("cust_1".into())));
        assert_eq!(m.get("type"), Some(&Value::Str("Customer".into())));
        assert_eq!(m.get("name"), Some(&Value::Str("Acme".into())));
    }

    #[test]
    fn format_entity_uses_configured_prefix() {
        let doc = Document { meta: sample_meta(), fields: BTreeMap::from([("name".to_string(), Value::Str("Acme".into()))]) };
        let formatted = format_entity(&doc, "$");
        let obj = formatted.as_obj().unwrap();
        assert_eq!(obj.get("$id"), Some(&Value::Str("cust_1".into())));
        assert_eq!(obj.get("$version"), Some(&Value::Num(1.0)));
        assert_eq!(obj.get("name"), Some(&Value::Str("Acme".into())));
        assert!(!obj.contains_key("$deletedAt"));
    }

    #[test]
    fn entity_to_document_prefixes_meta_with_underscore() {
        let doc = Document { meta: sample_meta(), fields: BTreeMap::new() };
        let flat = entity_to_document(&doc);
        assert_eq!(flat.get("_id"), Some(&Value::Str("cust_1".into())));
        assert_eq!(flat.get("_version"), Some(&Value::Num(1.0)));
        assert!(!flat.contains_key("_deletedAt"));
    }
}
