use std::collections::BTreeMap;
use std::sync::Arc;

use gateway_core::{AppError, RequestContext, Value};
use gateway_filter::{FilterAst, Op};
use gateway_schema::ParsedModel;
use indexmap::IndexMap;

use crate::document::format_entity;
use crate::ids::IdStrategy;
use crate::store::{FindOptions, Store};

/// Keys a client-supplied create/update body is never allowed to set
/// directly — the server is sole authority over these. Matches either
/// meta-prefix convention (`$version`, `_version`, …) regardless of which
/// one is currently configured, since a client might send the legacy
/// prefix even when the gateway is configured for the other.
fn strip_system_fields(data: &mut BTreeMap<String, Value>) {
    data.retain(|k, _| k == "id" || (!k.starts_with('$') && !k.starts_with('_')));
}

/// Fill in a `name` field when the caller didn't supply one: prefer the
/// model's declared `nameField`, then the `subject`/`title`/`description`
/// convention, then the bare model name.
fn derive_name(data: &mut BTreeMap<String, Value>, model: &ParsedModel) {
    if data.contains_key("name") {
        return;
    }
    let derived = model
        .name_field
        .as_deref()
        .and_then(|f| data.get(f))
        .or_else(|| data.get("subject"))
        .or_else(|| data.get("title"))
        .or_else(|| data.get("description"))
        .cloned()
        .unwrap_or_else(|| Value::Str(model.name.clone()));
    data.insert("name".to_string(), derived);
}

/// Translates model-level operations (create/get/update/delete/list/
/// search/count) to calls against a `Store` collaborator, enforcing the
/// behavioural contracts the `Store` interface itself doesn't know about:
/// system-field stripping, `$type`/`name` derivation, audit stamping, the
/// user-id fallback lookup, and text search. One adapter instance serves
/// every model in a schema; tenant scoping is the `Store` instance's job,
/// not this layer's.
pub struct StorageAdapter {
    store: Arc<dyn Store>,
    id_strategy: IdStrategy,
    meta_prefix: String,
}

impl StorageAdapter {
    pub fn new(store: Arc<dyn Store>, id_strategy: IdStrategy, meta_prefix: impl Into<String>) -> Self {
        Self { store, id_strategy, meta_prefix: meta_prefix.into() }
    }

    async fn find_by_primary_key(&self, model: &ParsedModel, id: &str) -> Result<Option<crate::document::Document>, AppError> {
        if model.primary_key == "id" {
            return Ok(None);
        }
        let ast = FilterAst::leaf(model.primary_key.clone(), Op::Eq, Value::Str(id.to_string()));
        let result = self
            .store
            .find(&model.plural, Some(&ast), FindOptions { limit: 1, offset: 0, sort: None })
            .await
            .map_err(AppError::from)?;
        Ok(result.items.into_iter().next())
    }

    pub async fn create(&self, model: &ParsedModel, ctx: &RequestContext, mut data: BTreeMap<String, Value>) -> Result<Value, AppError> {
        strip_system_fields(&mut data);
        let id = data.remove("id").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| self.id_strategy.generate(model));
        derive_name(&mut data, model);

        let mut payload = data;
        payload.insert("id".to_string(), Value::Str(id));
        payload.insert("type".to_string(), Value::Str(model.name.clone()));
        if let Some(actor) = &ctx.user_id {
            payload.insert("createdBy".to_string(), Value::Str(actor.clone()));
            payload.insert("updatedBy".to_string(), Value::Str(actor.clone()));
        }

        let doc = self.store.create(&model.plural, payload).await.map_err(AppError::from)?;
        Ok(format_entity(&doc, &self.meta_prefix))
    }

    pub async fn get(&self, model: &ParsedModel, id: &str) -> Result<Value, AppError> {
        let doc = match self.store.get(&model.plural, id).await.map_err(AppError::from)? {
            Some(doc) => doc,
            None => self
                .find_by_primary_key(model, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("{} not found", model.name)))?,
        };
        Ok(format_entity(&doc, &self.meta_prefix))
    }

    pub async fn update(&self, model: &ParsedModel, ctx: &RequestContext, id: &str, mut patch: BTreeMap<String, Value>) -> Result<Value, AppError> {
        strip_system_fields(&mut patch);
        patch.remove("id");
        if let Some(actor) = &ctx.user_id {
            patch.insert("updatedBy".to_string(), Value::Str(actor.clone()));
        }

        if let Some(doc) = self.store.update(&model.plural, id, patch.clone()).await.map_err(AppError::from)? {
            return Ok(format_entity(&doc, &self.meta_prefix));
        }
        if let Some(existing) = self.find_by_primary_key(model, id).await? {
            if let Some(doc) = self.store.update(&model.plural, &existing.meta.id, patch).await.map_err(AppError::from)? {
                return Ok(format_entity(&doc, &self.meta_prefix));
            }
        }
        Err(AppError::NotFound(format!("{} not found", model.name)))
    }

    pub async fn delete(&self, model: &ParsedModel, ctx: &RequestContext, id: &str) -> Result<Value, AppError> {
        let actor = ctx.user_id.clone();
        let result = self.store.delete(&model.plural, id, actor.clone()).await.map_err(AppError::from)?;
        if result.deleted_count > 0 {
            return Ok(deleted_value(id));
        }
        if let Some(existing) = self.find_by_primary_key(model, id).await? {
            let result = self.store.delete(&model.plural, &existing.meta.id, actor).await.map_err(AppError::from)?;
            if result.deleted_count > 0 {
                return Ok(deleted_value(&existing.meta.id));
            }
        }
        Err(AppError::NotFound(format!("{} not found", model.name)))
    }

    pub async fn list(
        &self,
        model: &ParsedModel,
        filter: Option<&FilterAst>,
        sort: Option<IndexMap<String, i8>>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Value>, u64, bool), AppError> {
        let result = self.store.find(&model.plural, filter, FindOptions { limit, offset, sort }).await.map_err(AppError::from)?;
        let items = result.items.iter().map(|d| format_entity(d, &self.meta_prefix)).collect();
        Ok((items, result.total, result.has_more))
    }

    pub async fn search(
        &self,
        model: &ParsedModel,
        query: &str,
        filter: Option<&FilterAst>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Value>, u64, bool), AppError> {
        let pattern = format!("(?i){query}");
        let text_or = FilterAst::Or(
            model.text_fields().map(|f| FilterAst::leaf(f.name.clone(), Op::Regex, Value::Str(pattern.clone()))).collect(),
        );
        let combined = match filter {
            Some(f) => text_or.and(f.clone()),
            None => text_or,
        };
        self.list(model, Some(&combined), None, limit, offset).await
    }

    pub async fn count(&self, model: &ParsedModel, filter: Option<&FilterAst>) -> Result<u64, AppError> {
        self.store.count(&model.plural, filter).await.map_err(AppError::from)
    }
}

fn deleted_value(id: &str) -> Value {
    Value::Obj(BTreeMap::from([("deleted".to_string(), Value::Bool(true)), ("id".to_string(), Value::Str(id.to_string()))]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use indexmap::IndexMap as Im;

    fn schema() -> gateway_schema::ParsedSchema {
        let raw: Im<String, Im<String, String>> = [(
            "Customer".to_string(),
            [
                ("name".to_string(), "string!".to_string()),
                ("subject".to_string(), "string?".to_string()),
                ("mrr".to_string(), "number?".to_string()),
            ]
            .into_iter()
            .collect(),
        )]
        .into_iter()
        .collect();
        gateway_schema::parse_schema(&raw).unwrap()
    }

    fn adapter() -> (StorageAdapter, gateway_schema::ParsedModel) {
        let schema = schema();
        let model = schema.get("Customer").unwrap().clone();
        let adapter = StorageAdapter::new(Arc::new(InMemoryStore::new()), IdStrategy::Cuid, "$".to_string());
        (adapter, model)
    }

    fn fields(pairs: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[tokio::test]
    async fn create_strips_system_fields_and_stamps_type() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com").with_user(Some("user_1".into()));
        let data = fields(vec![
            ("id", Value::Str("cust_1".into())),
            ("name", Value::Str("Acme".into())),
            ("$version", Value::Num(999.0)),
            ("$deletedAt", Value::Str("2025-01-01T00:00:00Z".into())),
        ]);
        let result = adapter.create(&model, &ctx, data).await.unwrap();
        let obj = result.as_obj().unwrap();
        assert_eq!(obj.get("$id"), Some(&Value::Str("cust_1".into())));
        assert_eq!(obj.get("$type"), Some(&Value::Str("Customer".into())));
        assert_eq!(obj.get("$version"), Some(&Value::Num(1.0)));
        assert!(!obj.contains_key("$deletedAt"));
        assert_eq!(obj.get("$createdBy"), Some(&Value::Str("user_1".into())));
    }

    #[tokio::test]
    async fn create_derives_name_from_subject() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        let data = fields(vec![("id", Value::Str("cust_2".into())), ("subject", Value::Str("Globex".into()))]);
        let result = adapter.create(&model, &ctx, data).await.unwrap();
        assert_eq!(result.as_obj().unwrap().get("name"), Some(&Value::Str("Globex".into())));
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        let data = || fields(vec![("id", Value::Str("cust_1".into()))]);
        adapter.create(&model, &ctx, data()).await.unwrap();
        let err = adapter.create(&model, &ctx, data()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn get_and_update_and_delete_round_trip() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        adapter.create(&model, &ctx, fields(vec![("id", Value::Str("cust_1".into())), ("name", Value::Str("Acme".into())), ("mrr", Value::Num(99.0))])).await.unwrap();

        let fetched = adapter.get(&model, "cust_1").await.unwrap();
        assert_eq!(fetched.as_obj().unwrap().get("mrr"), Some(&Value::Num(99.0)));

        let updated = adapter.update(&model, &ctx, "cust_1", fields(vec![("mrr", Value::Num(199.0))])).await.unwrap();
        let obj = updated.as_obj().unwrap();
        assert_eq!(obj.get("mrr"), Some(&Value::Num(199.0)));
        assert_eq!(obj.get("name"), Some(&Value::Str("Acme".into())));
        assert_eq!(obj.get("$version"), Some(&Value::Num(2.0)));

        adapter.delete(&model, &ctx, "cust_1").await.unwrap();
        let err = adapter.get(&model, "cust_1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        let err = adapter.update(&model, &ctx, "nope", BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_matches_across_text_fields() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        adapter.create(&model, &ctx, fields(vec![("id", Value::Str("cust_1".into())), ("name", Value::Str("Acme Corp".into()))])).await.unwrap();
        adapter.create(&model, &ctx, fields(vec![("id", Value::Str("cust_2".into())), ("name", Value::Str("Globex".into()))])).await.unwrap();

        let (items, total, _) = adapter.search(&model, "acme", None, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].as_obj().unwrap().get("$id"), Some(&Value::Str("cust_1".into())));
    }

    #[tokio::test]
    async fn count_respects_filter() {
        let (adapter, model) = adapter();
        let ctx = RequestContext::new("req_1", "https://api.example.com");
        adapter.create(&model, &ctx, fields(vec![("id", Value::Str("cust_1".into())), ("mrr", Value::Num(10.0))])).await.unwrap();
        adapter.create(&model, &ctx, fields(vec![("id", Value::Str("cust_2".into())), ("mrr", Value::Num(200.0))])).await.unwrap();
        let ast = FilterAst::leaf("mrr", Op::Gte, Value::Num(100.0));
        assert_eq!(adapter.count(&model, Some(&ast)).await.unwrap(), 1);
    }
}
