use std::collections::BTreeMap;

use gateway_core::Value;

/// Build the `links` object shared by every envelope: `self`, `home`,
/// plus whatever extra named links the caller supplies (pagination
/// links, error-recovery links, ...).
pub fn build_links(self_url: &str, home_url: &str, extra: BTreeMap<String, String>) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("self".to_string(), Value::Str(self_url.to_string()));
    obj.insert("home".to_string(), Value::Str(home_url.to_string()));
    for (name, href) in extra {
        obj.insert(name, Value::Str(href));
    }
    Value::Obj(obj)
}

/// Rewrite a query string's `offset`/`limit` pair to the given values,
/// leaving every other param (filters, sort, ...) untouched.
pub fn with_offset(query: &str, offset: u32, limit: u32) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == "offset" || key == "limit" {
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    serializer.append_pair("offset", &offset.to_string());
    serializer.append_pair("limit", &limit.to_string());
    serializer.finish()
}

/// Build the pagination links for a list response: `first`, `prev?`,
/// `next?`, `last`. `prev`/`next` are omitted when not applicable.
pub fn build_page_links(base_url: &str, query: &str, limit: u32, offset: u32, total: u64, has_more: bool) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("first".to_string(), Value::Str(format!("{base_url}?{}", with_offset(query, 0, limit))));

    if offset > 0 {
        let prev_offset = offset.saturating_sub(limit);
        obj.insert("prev".to_string(), Value::Str(format!("{base_url}?{}", with_offset(query, prev_offset, limit))));
    }

    if has_more {
        let next_offset = offset.saturating_add(limit);
        obj.insert("next".to_string(), Value::Str(format!("{base_url}?{}", with_offset(query, next_offset, limit))));
    }

    let last_offset = if total == 0 { 0 } else { (((total - 1) / limit as u64) * limit as u64) as u32 };
    obj.insert("last".to_string(), Value::Str(format!("{base_url}?{}", with_offset(query, last_offset, limit))));

    Value::Obj(obj)
}

/// The recovery-link targets `buildErrorLinks` may stitch into a
/// code-specific link set; a caller supplies whichever of these it has
/// on hand, and unused ones are simply never referenced.
#[derive(Debug, Clone, Default)]
pub struct ErrorLinkContext {
    pub home: String,
    pub collection: Option<String>,
    pub search: Option<String>,
    pub create: Option<String>,
    pub login: Option<String>,
    pub register: Option<String>,
    pub current: Option<String>,
}

/// Derive actionable recovery links for an error code. Pure function of
/// `(code, context)`, per the envelope's `buildErrorLinks` contract.
pub fn build_error_links(code: &str, ctx: &ErrorLinkContext) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("home".to_string(), Value::Str(ctx.home.clone()));

    let mut add = |key: &str, value: &Option<String>| {
        if let Some(value) = value {
            obj.insert(key.to_string(), Value::Str(value.clone()));
        }
    };

    match code {
        "NOT_FOUND" => {
            add("collection", &ctx.collection);
            add("search", &ctx.search);
            add("create", &ctx.create);
        }
        "UNAUTHORIZED" | "AUTH_REQUIRED" | "INVALID_TOKEN" => {
            add("login", &ctx.login);
            add("register", &ctx.register);
        }
        "CONFLICT" => {
            add("current", &ctx.current);
        }
        _ => {}
    }

    Value::Obj(obj)
}
