use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use gateway_core::Value;
use gateway_filter::{matches, FilterAst};

use crate::document::{partition_meta, Document, Meta};
use crate::error::StoreError;
use crate::store::{DeleteResult, FindOptions, FindResult, Store};

/// A `DashMap`-backed `Store` implementation: one inner map per
/// collection, keyed by document id. This is the gateway's default/dev/
/// test persistence backend, not a production store — the real one is
/// an external collaborator per the component boundary. Grounded on
/// `quarlus-cache`'s `TtlCache`/`InMemoryStore` pattern (a `DashMap`
/// wrapped in a narrow trait, concurrent reads/writes without an
/// external lock).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: DashMap<String, DashMap<String, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { collections: DashMap::new() }
    }

    fn collection(&self, name: &str) -> RefMut<'_, String, DashMap<String, Document>> {
        self.collections.entry(name.to_string()).or_insert_with(DashMap::new)
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.as_str().unwrap_or("").cmp(b.as_str().unwrap_or("")),
    }
}

fn sort_documents(items: Vec<Document>, sort: &indexmap::IndexMap<String, i8>) -> Vec<Document> {
    let mut decorated: Vec<(BTreeMap<String, Value>, Document)> =
        items.into_iter().map(|d| (d.as_matchable(), d)).collect();
    decorated.sort_by(|(a, _), (b, _)| {
        for (field, dir) in sort {
            let ord = compare_values(a.get(field).unwrap_or(&Value::Null), b.get(field).unwrap_or(&Value::Null));
            if ord != Ordering::Equal {
                return if *dir < 0 { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    });
    decorated.into_iter().map(|(_, d)| d).collect()
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find(&self, model_type: &str, filter: Option<&FilterAst>, opts: FindOptions) -> Result<FindResult, StoreError> {
        let coll = self.collection(model_type);
        let mut items: Vec<Document> = Vec::new();
        for entry in coll.iter() {
            let doc = entry.value();
            if doc.is_deleted() {
                continue;
            }
            let keep = match filter {
                Some(ast) => matches(&doc.as_matchable(), ast)
                    .map_err(|e| StoreError::Internal(e.to_string()))?,
                None => true,
            };
            if keep {
                items.push(doc.clone());
            }
        }
        if let Some(sort) = &opts.sort {
            items = sort_documents(items, sort);
        }
        let total = items.len() as u64;
        let page: Vec<Document> = items.into_iter().skip(opts.offset).take(opts.limit.max(1)).collect();
        let has_more = (opts.offset + page.len()) < total as usize;
        Ok(FindResult { items: page, total, has_more })
    }

    async fn get(&self, model_type: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let coll = self.collection(model_type);
        Ok(coll.get(id).map(|e| e.value().clone()).filter(|d| !d.is_deleted()))
    }

    async fn create(&self, model_type: &str, data: BTreeMap<String, Value>) -> Result<Document, StoreError> {
        let (meta, fields) = partition_meta(data);
        let id = match meta.get("id").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => format!("{model_type}_{:x}{:08x}", now_ms(), rand::random::<u32>()),
        };

        let coll = self.collection(model_type);
        if coll.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{model_type} with id `{id}` already exists")));
        }

        let now = Utc::now();
        let created_by = meta.get("createdBy").and_then(Value::as_str).map(str::to_string);
        let doc = Document {
            meta: Meta {
                id: id.clone(),
                doc_type: meta.get("type").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| model_type.to_string()),
                version: 1,
                created_at: now,
                updated_at: now,
                updated_by: meta.get("updatedBy").and_then(Value::as_str).map(str::to_string).or_else(|| created_by.clone()),
                created_by,
                deleted_at: None,
                deleted_by: None,
                context: meta.get("context").cloned(),
            },
            fields,
        };
        coll.insert(id, doc.clone());
        Ok(doc)
    }

    async fn update(&self, model_type: &str, id: &str, set: BTreeMap<String, Value>) -> Result<Option<Document>, StoreError> {
        let coll = self.collection(model_type);
        let Some(mut entry) = coll.get_mut(id) else {
            return Ok(None);
        };
        if entry.is_deleted() {
            return Ok(None);
        }
        let (meta, fields) = partition_meta(set);
        for (k, v) in fields {
            entry.fields.insert(k, v);
        }
        entry.meta.version += 1;
        entry.meta.updated_at = Utc::now();
        if let Some(by) = meta.get("updatedBy").and_then(Value::as_str) {
            entry.meta.updated_by = Some(by.to_string());
        }
        if let Some(ctx) = meta.get("context") {
            entry.meta.context = Some(ctx.clone());
        }
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, model_type: &str, id: &str, actor: Option<String>) -> Result<DeleteResult, StoreError> {
        let coll = self.collection(model_type);
        match coll.get_mut(id) {
            Some(mut entry) if !entry.is_deleted() => {
                entry.meta.deleted_at = Some(Utc::now());
                entry.meta.deleted_by = actor;
                Ok(DeleteResult { deleted_count: 1 })
            }
            _ => Ok(DeleteResult { deleted_count: 0 }),
        }
    }

    async fn count(&self, model_type: &str, filter: Option<&FilterAst>) -> Result<u64, StoreError> {
        let coll = self.collection(model_type);
        let mut n = 0u64;
        for entry in coll.iter() {
            let doc = entry.value();
            if doc.is_deleted() {
                continue;
            }
            let keep = match filter {
                Some(ast) => matches(&doc.as_matchable(), ast).map_err(|e| StoreError::Internal(e.to_string()))?,
                None => true,
            };
            if keep {
                n += 1;
            }
        }
        Ok(n)
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
