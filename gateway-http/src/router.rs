use std::collections::BTreeMap;
use std::sync::Arc;

use gateway_auth::{Authenticator, Identity, MaybeAuthenticatedUser};
use gateway_core::{AppError, GatewayConfig, RequestContext, Value};
use gateway_filter::{parse_query, FilterAst, FilterError, Op};
use gateway_mcp::ToolRegistry;
use gateway_schema::{ParsedModel, ParsedSchema, RelationKind};
use gateway_store::{IdStrategy, StorageAdapter, StoreProvider};
use gateway_validate::validate_document;
use gateway_web::{
    from_fn_with_state, get, post, Extension, FromRef, HeaderMap, IntoResponse, Json, Next, Path, Request, Response,
    Router, State, StatusCode, Uri, HOST,
};
use indexmap::IndexMap;

use crate::envelope::{error_envelope, success_envelope, ApiInfo};
use crate::links::{build_error_links, build_links, build_page_links, ErrorLinkContext};
use crate::mcp::mcp_handler;
use crate::query::{parse_page_params, parse_sort_param};
use crate::tenant::{extract_tenant_from_host, extract_tenant_from_path};

/// Shared application state threaded through every handler via axum's
/// `State` extractor. One `GatewayState` backs the whole mounted router
/// regardless of how many models or tenants it serves.
#[derive(Clone)]
pub struct GatewayState {
    pub schema: Arc<ParsedSchema>,
    pub config: Arc<GatewayConfig>,
    pub providers: Arc<dyn StoreProvider>,
    pub id_strategy: IdStrategy,
    pub authenticator: Arc<Authenticator>,
    pub api: ApiInfo,
    pub base_domain: Option<String>,
    pub tools: Arc<ToolRegistry>,
}

impl FromRef<GatewayState> for Arc<Authenticator> {
    fn from_ref(state: &GatewayState) -> Self {
        state.authenticator.clone()
    }
}

/// Which model a per-model sub-router's routes belong to. Attached by a
/// thin `Extension` layer scoped to that sub-router rather than threaded
/// through per-route closures, so every handler keeps an ordinary axum
/// extractor signature.
#[derive(Clone)]
struct ModelTag(String);

/// The tenant a request resolved to, plus enough of the original request
/// shape to rebuild hypermedia links after the path has been rewritten.
#[derive(Clone, Debug)]
struct ResolvedTenant {
    tenant: Option<String>,
    via_path: bool,
    original_path_and_query: String,
}

/// Strips any tenant prefix (path or subdomain) off the incoming request
/// before routing, stashing the resolution as a request extension so
/// handlers can rebuild tenant-aware links and pick the right `Store`.
/// Layered outermost on the fully merged router.
async fn tenant_resolution(State(state): State<GatewayState>, mut req: Request, next: Next) -> Response {
    let original_uri = req.uri().clone();
    let path = original_uri.path().to_string();
    let query = original_uri.query().map(|q| format!("?{q}"));
    let original_path_and_query = format!("{path}{}", query.clone().unwrap_or_default());

    let host = req.headers().get(HOST).and_then(|v| v.to_str().ok()).map(str::to_string);

    let (path_tenant, stripped_path) = extract_tenant_from_path(&path);
    let (tenant, stripped_path, via_path) = if let Some(slug) = path_tenant {
        (Some(slug), stripped_path, true)
    } else {
        let host_tenant = match (&host, &state.base_domain) {
            (Some(h), Some(domain)) => extract_tenant_from_host(h, domain),
            _ => None,
        };
        (host_tenant, path, false)
    };

    let new_uri = format!("{stripped_path}{}", query.unwrap_or_default());
    if let Ok(uri) = new_uri.parse() {
        *req.uri_mut() = uri;
    }
    req.extensions_mut().insert(ResolvedTenant { tenant, via_path, original_path_and_query });

    next.run(req).await
}

fn scheme_and_host(headers: &HeaderMap) -> String {
    let host = headers.get(HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    format!("http://{host}")
}

fn mount_prefix(resolved: &ResolvedTenant) -> String {
    match (&resolved.tenant, resolved.via_path) {
        (Some(slug), true) => format!("/~{slug}"),
        _ => String::new(),
    }
}

fn raw_query_pairs(query: &str) -> IndexMap<String, String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .fold(IndexMap::new(), |mut acc, (k, v)| {
            acc.insert(k, v);
            acc
        })
}

fn filter_err(e: FilterError) -> AppError {
    AppError::BadRequest(e.to_string())
}

fn validation_err(errors: gateway_validate::ValidationErrors) -> AppError {
    AppError::Validation(errors.0)
}

fn json_to_fields(value: serde_json::Value) -> Result<BTreeMap<String, Value>, AppError> {
    match Value::from(value) {
        Value::Obj(map) => Ok(map),
        Value::Null => Ok(BTreeMap::new()),
        _ => Err(AppError::BadRequest("request body must be a JSON object".to_string())),
    }
}

/// Drop fields the caller didn't ask for via `fields=`/`exclude=`.
/// Meta-prefixed keys (`$id`, `_id`, ...) are always kept regardless of
/// projection so a trimmed response stays addressable.
fn project_entity(entity: Value, fields: &Option<Vec<String>>, exclude: &Option<Vec<String>>) -> Value {
    let Value::Obj(obj) = entity else { return entity };
    let kept = obj
        .into_iter()
        .filter(|(k, _)| {
            if k.starts_with('$') || k.starts_with('_') {
                return true;
            }
            if let Some(fields) = fields {
                if !fields.iter().any(|f| f == k) {
                    return false;
                }
            }
            if let Some(exclude) = exclude {
                if exclude.iter().any(|f| f == k) {
                    return false;
                }
            }
            true
        })
        .collect();
    Value::Obj(kept)
}

fn entity_field<'a>(entity: &'a Value, name: &str) -> Option<&'a Value> {
    match entity {
        Value::Obj(obj) => obj.get(name),
        _ => None,
    }
}

fn build_singular_index(schema: &ParsedSchema) -> IndexMap<String, String> {
    schema.values().map(|m| (m.singular.clone(), m.name.clone())).collect()
}

fn model_by_id_prefix<'a>(schema: &'a ParsedSchema, id: &str) -> Option<&'a ParsedModel> {
    let prefix = id.split_once('_')?.0;
    let singulars = build_singular_index(schema);
    let model_name = singulars.get(prefix)?.clone();
    schema.get(&model_name)
}

fn adapter_for(state: &GatewayState, tenant: Option<&str>) -> StorageAdapter {
    let store = state.providers.store_for(tenant);
    StorageAdapter::new(store, state.id_strategy.clone(), state.config.meta_prefix.as_str().to_string())
}

/// Everything a handler needs to build request-scoped envelope links and
/// a `RequestContext` without recomputing the host/tenant/path bookkeeping
/// at every call site.
struct RequestShape {
    resolved: ResolvedTenant,
    ctx: RequestContext,
    base: String,
    mount_prefix: String,
}

fn request_shape(resolved: &ResolvedTenant, headers: &HeaderMap, identity: &Option<Identity>) -> RequestShape {
    let base = scheme_and_host(headers);
    let mount_prefix = mount_prefix(resolved);
    let request_id = uuid::Uuid::new_v4().to_string();
    let ctx = RequestContext::new(request_id, base.clone())
        .with_tenant(resolved.tenant.clone())
        .with_user(identity.as_ref().map(|i| i.user_id.clone()));
    RequestShape { resolved: resolved.clone(), ctx, base, mount_prefix }
}

impl RequestShape {
    fn self_url(&self) -> String {
        format!("{}{}", self.base, self.resolved.original_path_and_query)
    }

    fn home_url(&self) -> String {
        format!("{}{}/", self.base, self.mount_prefix)
    }

    fn collection_url(&self, plural: &str) -> String {
        format!("{}{}/{plural}", self.base, self.mount_prefix)
    }
}

fn error_ctx(shape: &RequestShape, model: Option<&ParsedModel>) -> ErrorLinkContext {
    let (collection, search, create) = match model {
        Some(model) => {
            let collection = shape.collection_url(&model.plural);
            (Some(collection.clone()), Some(format!("{collection}/search?q=")), Some(collection))
        }
        None => (None, None, None),
    };
    ErrorLinkContext { home: shape.home_url(), collection, search, create, login: None, register: None, current: None }
}

fn ok_json(status: StatusCode, state: &GatewayState, shape: &RequestShape, payload_key: &str, data: Value, meta: Option<Value>, extra: BTreeMap<String, String>, identity: Option<&Identity>) -> Response {
    let links = build_links(&shape.self_url(), &shape.home_url(), extra);
    let body = success_envelope(&state.api, payload_key, data, meta, links, identity);
    (status, Json(serde_json::Value::from(body))).into_response()
}

fn err_json(state: &GatewayState, shape: &RequestShape, err: AppError, model: Option<&ParsedModel>) -> Response {
    let status = err.status();
    let ctx = error_ctx(shape, model);
    let mut links_obj = match build_error_links(err.code(), &ctx) {
        Value::Obj(o) => o,
        _ => BTreeMap::new(),
    };
    links_obj.insert("self".to_string(), Value::Str(shape.self_url()));
    let body = error_envelope(&state.api, &err, Value::Obj(links_obj));
    (status, Json(serde_json::Value::from(body))).into_response()
}

fn links_to_extra(links: Value) -> BTreeMap<String, String> {
    match links {
        Value::Obj(obj) => obj.into_iter().filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string()))).collect(),
        _ => BTreeMap::new(),
    }
}

/// Build the full router: every model's REST surface, the global
/// id-prefix dispatch routes, and the tenant-resolution middleware that
/// wraps all of it.
pub fn build_router(state: GatewayState) -> Router {
    let mut router = Router::new();
    for model in state.schema.values() {
        router = router.merge(mount_model(model));
    }
    if state.config.mcp.enabled {
        router = router.route("/mcp", post(mcp_handler));
    }
    router = router
        .route("/:id", get(global_get).put(global_put).delete(global_delete))
        .route("/:id/:verb", post(global_verb));

    router.layer(from_fn_with_state(state.clone(), tenant_resolution)).with_state(state)
}

fn mount_model(model: &ParsedModel) -> Router<GatewayState> {
    let plural = &model.plural;
    Router::new()
        .route(&format!("/{plural}"), get(list_handler).post(create_handler))
        .route(&format!("/{plural}/$count"), get(count_handler))
        .route(&format!("/{plural}/search"), get(search_handler))
        .route(
            &format!("/{plural}/:id"),
            get(get_handler).put(replace_handler).patch(update_handler).delete(delete_handler),
        )
        .route(&format!("/{plural}/:id/:relation"), get(relation_handler))
        .layer(Extension(ModelTag(model.name.clone())))
}

// ---------------------------------------------------------------------
// Core operations, shared between model-scoped and global-dispatch routes
// ---------------------------------------------------------------------

async fn do_list(
    state: &GatewayState,
    model: &ParsedModel,
    tenant: Option<&str>,
    raw_query: &str,
) -> Result<(Vec<Value>, u64, bool, u32, u32, Option<Vec<String>>, Option<Vec<String>>), AppError> {
    let parsed = parse_query(raw_query).map_err(filter_err)?;
    let params = raw_query_pairs(raw_query);
    let page = parse_page_params(&params, &state.config);
    let sort = parse_sort_param(&params)?;
    let sort_opt = if sort.is_empty() { None } else { Some(sort) };

    let adapter = adapter_for(state, tenant);
    let (items, total, has_more) = adapter.list(model, Some(&parsed.filter), sort_opt, page.limit as usize, page.offset as usize).await?;
    Ok((items, total, has_more, page.limit, page.offset, parsed.fields, parsed.exclude))
}

async fn do_count(state: &GatewayState, model: &ParsedModel, tenant: Option<&str>, raw_query: &str) -> Result<u64, AppError> {
    let parsed = parse_query(raw_query).map_err(filter_err)?;
    let adapter = adapter_for(state, tenant);
    adapter.count(model, Some(&parsed.filter)).await
}

async fn do_search(
    state: &GatewayState,
    model: &ParsedModel,
    tenant: Option<&str>,
    raw_query: &str,
) -> Result<(Vec<Value>, u64, bool, u32, u32, String), AppError> {
    let params = raw_query_pairs(raw_query);
    let query = params.get("q").cloned().unwrap_or_default();
    let page = parse_page_params(&params, &state.config);

    let remainder: String = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().filter(|(k, _)| !matches!(k.as_str(), "q" | "limit" | "offset" | "page")))
        .finish();
    let parsed = parse_query(&remainder).map_err(filter_err)?;
    let extra_filter = if parsed.filter.is_empty_and() { None } else { Some(&parsed.filter) };

    let adapter = adapter_for(state, tenant);
    let (items, total, has_more) = adapter.search(model, &query, extra_filter, page.limit as usize, page.offset as usize).await?;
    Ok((items, total, has_more, page.limit, page.offset, query))
}

async fn do_create(state: &GatewayState, model: &ParsedModel, ctx: &RequestContext, tenant: Option<&str>, body: serde_json::Value) -> Result<Value, AppError> {
    let data = json_to_fields(body)?;
    let errors = validate_document(model, &data, false);
    if !errors.is_empty() {
        return Err(validation_err(errors));
    }
    let adapter = adapter_for(state, tenant);
    adapter.create(model, ctx, data).await
}

async fn do_get(state: &GatewayState, model: &ParsedModel, tenant: Option<&str>, id: &str) -> Result<Value, AppError> {
    let adapter = adapter_for(state, tenant);
    adapter.get(model, id).await
}

/// `PUT` is accepted as a full replacement from the caller's perspective
/// (full, non-partial validation) but is implemented as a merge against
/// the existing document — the `Store` contract this gateway is built
/// against only exposes a `$set`-style merge, not a destructive replace.
async fn do_replace(state: &GatewayState, model: &ParsedModel, ctx: &RequestContext, tenant: Option<&str>, id: &str, body: serde_json::Value) -> Result<Value, AppError> {
    let data = json_to_fields(body)?;
    let errors = validate_document(model, &data, false);
    if !errors.is_empty() {
        return Err(validation_err(errors));
    }
    let adapter = adapter_for(state, tenant);
    adapter.update(model, ctx, id, data).await
}

async fn do_update(state: &GatewayState, model: &ParsedModel, ctx: &RequestContext, tenant: Option<&str>, id: &str, body: serde_json::Value) -> Result<Value, AppError> {
    let data = json_to_fields(body)?;
    let errors = validate_document(model, &data, true);
    if !errors.is_empty() {
        return Err(validation_err(errors));
    }
    let adapter = adapter_for(state, tenant);
    adapter.update(model, ctx, id, data).await
}

async fn do_delete(state: &GatewayState, model: &ParsedModel, ctx: &RequestContext, tenant: Option<&str>, id: &str) -> Result<Value, AppError> {
    let adapter = adapter_for(state, tenant);
    adapter.delete(model, ctx, id).await
}

/// Follow a relation field from an already-fetched source entity.
/// Forward+single fetches one target by id; forward+many fetches each id
/// in the array; inverse always resolves to a list, filtering the target
/// collection on the field that points back at `source_id`. When that
/// pointing-back field is itself an array (a many-to-many edge), there is
/// no array-contains operator in the filter AST, so the target
/// collection is scanned in-process instead.
async fn do_relation(state: &GatewayState, model: &ParsedModel, tenant: Option<&str>, source_id: &str, relation_name: &str) -> Result<Value, AppError> {
    let field = model
        .field(relation_name)
        .ok_or_else(|| AppError::NotFound(format!("{} has no relation '{relation_name}'", model.name)))?;
    let relation = field.relation.as_ref().ok_or_else(|| AppError::NotFound(format!("'{relation_name}' is not a relation")))?;

    let target_model = state
        .schema
        .get(&relation.target)
        .ok_or_else(|| AppError::Internal(format!("relation target model '{}' not found", relation.target)))?;
    let adapter = adapter_for(state, tenant);

    match relation.kind {
        RelationKind::Forward => {
            let source = adapter.get(model, source_id).await?;
            let raw = entity_field(&source, relation_name).cloned().unwrap_or(Value::Null);
            if relation.many {
                let ids = raw.as_list().map(|l| l.to_vec()).unwrap_or_default();
                let mut items = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(id) = id.as_str() {
                        if let Ok(entity) = adapter.get(target_model, id).await {
                            items.push(entity);
                        }
                    }
                }
                Ok(Value::List(items))
            } else {
                match raw.as_str() {
                    Some(id) => adapter.get(target_model, id).await,
                    None => Err(AppError::NotFound(format!("{} has no {relation_name}", model.name))),
                }
            }
        }
        RelationKind::Inverse => {
            let inverse_field_name = relation.inverse_field.clone().unwrap_or_else(|| model.name.to_ascii_lowercase());
            let inverse_field = target_model.field(&inverse_field_name);
            let inverse_is_array = inverse_field.map(|f| f.array || f.relation.as_ref().is_some_and(|r| r.many)).unwrap_or(false);

            if inverse_is_array {
                let (all, _, _) = adapter.list(target_model, None, None, 10_000, 0).await?;
                let matching = all
                    .into_iter()
                    .filter(|entity| match entity_field(entity, &inverse_field_name) {
                        Some(Value::List(ids)) => ids.iter().any(|v| v.as_str() == Some(source_id)),
                        _ => false,
                    })
                    .collect();
                Ok(Value::List(matching))
            } else {
                let ast = FilterAst::leaf(inverse_field_name, Op::Eq, Value::Str(source_id.to_string()));
                let (items, _, _) = adapter.list(target_model, Some(&ast), None, 10_000, 0).await?;
                Ok(Value::List(items))
            }
        }
    }
}

// ---------------------------------------------------------------------
// Model-scoped handlers
// ---------------------------------------------------------------------

async fn list_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    uri: Uri,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");
    let query = uri.query().unwrap_or("");

    match do_list(&state, model, resolved.tenant.as_deref(), query).await {
        Ok((items, total, has_more, limit, offset, fields, exclude)) => {
            let items: Vec<Value> = items.into_iter().map(|v| project_entity(v, &fields, &exclude)).collect();
            let links = build_page_links(&shape.collection_url(&model.plural), query, limit, offset, total, has_more);
            let meta = Value::Obj(BTreeMap::from([
                ("total".to_string(), Value::Num(total as f64)),
                ("limit".to_string(), Value::Num(limit as f64)),
                ("offset".to_string(), Value::Num(offset as f64)),
                ("hasMore".to_string(), Value::Bool(has_more)),
            ]));
            ok_json(StatusCode::OK, &state, &shape, &model.plural, Value::List(items), Some(meta), links_to_extra(links), identity.as_ref())
        }
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn count_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    uri: Uri,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_count(&state, model, resolved.tenant.as_deref(), uri.query().unwrap_or("")).await {
        Ok(count) => ok_json(StatusCode::OK, &state, &shape, "count", Value::Num(count as f64), None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn search_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    uri: Uri,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_search(&state, model, resolved.tenant.as_deref(), uri.query().unwrap_or("")).await {
        Ok((items, total, has_more, limit, offset, query)) => {
            let meta = Value::Obj(BTreeMap::from([
                ("total".to_string(), Value::Num(total as f64)),
                ("limit".to_string(), Value::Num(limit as f64)),
                ("offset".to_string(), Value::Num(offset as f64)),
                ("hasMore".to_string(), Value::Bool(has_more)),
                ("query".to_string(), Value::Str(query)),
            ]));
            ok_json(StatusCode::OK, &state, &shape, &model.plural, Value::List(items), Some(meta), BTreeMap::new(), identity.as_ref())
        }
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn create_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_create(&state, model, &shape.ctx, resolved.tenant.as_deref(), body).await {
        Ok(entity) => ok_json(StatusCode::CREATED, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn get_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_get(&state, model, resolved.tenant.as_deref(), &id).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn replace_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_replace(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id, body).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn update_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_update(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id, body).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn delete_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_delete(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn relation_handler(
    State(state): State<GatewayState>,
    Extension(ModelTag(model_name)): Extension<ModelTag>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path((id, relation)): Path<(String, String)>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = state.schema.get(&model_name).expect("model mounted from schema");

    match do_relation(&state, model, resolved.tenant.as_deref(), &id, &relation).await {
        Ok(data) => {
            let payload_key = if matches!(data, Value::List(_)) { model.plural.as_str() } else { "data" };
            ok_json(StatusCode::OK, &state, &shape, payload_key, data, None, BTreeMap::new(), identity.as_ref())
        }
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

// ---------------------------------------------------------------------
// Global id-prefix dispatch
// ---------------------------------------------------------------------

fn resolve_global_model<'a>(state: &'a GatewayState, id: &str) -> Result<&'a ParsedModel, AppError> {
    model_by_id_prefix(&state.schema, id).ok_or_else(|| AppError::NotFound("Unknown entity type prefix".to_string()))
}

async fn global_get(
    State(state): State<GatewayState>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = match resolve_global_model(&state, &id) {
        Ok(m) => m,
        Err(e) => return err_json(&state, &shape, e, None),
    };
    match do_get(&state, model, resolved.tenant.as_deref(), &id).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn global_put(
    State(state): State<GatewayState>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = match resolve_global_model(&state, &id) {
        Ok(m) => m,
        Err(e) => return err_json(&state, &shape, e, None),
    };
    match do_replace(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id, body).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn global_delete(
    State(state): State<GatewayState>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path(id): Path<String>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = match resolve_global_model(&state, &id) {
        Ok(m) => m,
        Err(e) => return err_json(&state, &shape, e, None),
    };
    match do_delete(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id).await {
        Ok(entity) => ok_json(StatusCode::OK, &state, &shape, "data", entity, None, BTreeMap::new(), identity.as_ref()),
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

/// `POST /:id/:verb` — records `lastVerb` on the entity and merges any
/// supplied payload, per the verb-execution contract.
async fn global_verb(
    State(state): State<GatewayState>,
    Extension(resolved): Extension<ResolvedTenant>,
    headers: HeaderMap,
    Path((id, verb)): Path<(String, String)>,
    MaybeAuthenticatedUser(identity): MaybeAuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let shape = request_shape(&resolved, &headers, &identity);
    let model = match resolve_global_model(&state, &id) {
        Ok(m) => m,
        Err(e) => return err_json(&state, &shape, e, None),
    };

    let result = run_verb(&state, model, &shape.ctx, resolved.tenant.as_deref(), &id, &verb, body).await;
    match result {
        Ok(entity) => {
            let meta = Value::Obj(BTreeMap::from([("verb".to_string(), Value::Str(verb))]));
            ok_json(StatusCode::OK, &state, &shape, "data", entity, Some(meta), BTreeMap::new(), identity.as_ref())
        }
        Err(e) => err_json(&state, &shape, e, Some(model)),
    }
}

async fn run_verb(
    state: &GatewayState,
    model: &ParsedModel,
    ctx: &RequestContext,
    tenant: Option<&str>,
    id: &str,
    verb: &str,
    body: serde_json::Value,
) -> Result<Value, AppError> {
    let mut data = json_to_fields(body)?;
    data.insert("lastVerb".to_string(), Value::Str(verb.to_string()));
    let errors = validate_document(model, &data, true);
    if !errors.is_empty() {
        return Err(validation_err(errors));
    }
    let adapter = adapter_for(state, tenant);
    adapter.update(model, ctx, id, data).await
}
