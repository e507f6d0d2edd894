use std::collections::BTreeMap;

use gateway_auth::Identity;
use gateway_core::{AppError, Value};

/// The `api` block every envelope carries, describing the gateway itself
/// rather than any particular resource.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl ApiInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), version: None, description: None }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = BTreeMap::new();
        obj.insert("name".to_string(), Value::Str(self.name.clone()));
        if let Some(version) = &self.version {
            obj.insert("version".to_string(), Value::Str(version.clone()));
        }
        if let Some(description) = &self.description {
            obj.insert("description".to_string(), Value::Str(description.clone()));
        }
        Value::Obj(obj)
    }
}

fn identity_to_value(identity: &Identity) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("id".to_string(), Value::Str(identity.user_id.clone()));
    if let Some(email) = &identity.email {
        obj.insert("email".to_string(), Value::Str(email.clone()));
    }
    if let Some(name) = &identity.name {
        obj.insert("name".to_string(), Value::Str(name.clone()));
    }
    Value::Obj(obj)
}

/// Build a success envelope: `{ api, [payloadKey]: data, meta?, links,
/// user? }`. `meta` is omitted when `None`; `user` is omitted when no
/// identity was attached to the request.
pub fn success_envelope(
    api: &ApiInfo,
    payload_key: &str,
    data: Value,
    meta: Option<Value>,
    links: Value,
    user: Option<&Identity>,
) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("api".to_string(), api.to_value());
    obj.insert(payload_key.to_string(), data);
    if let Some(meta) = meta {
        obj.insert("meta".to_string(), meta);
    }
    obj.insert("links".to_string(), links);
    if let Some(user) = user {
        obj.insert("user".to_string(), identity_to_value(user));
    }
    Value::Obj(obj)
}

/// Build an error envelope. The payload key is always omitted; `api` and
/// `links.self` remain present so even 5xx responses are navigable.
pub fn error_envelope(api: &ApiInfo, err: &AppError, links: Value) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("api".to_string(), api.to_value());
    obj.insert("links".to_string(), links);
    obj.insert("error".to_string(), Value::from(err.to_error_value()));
    Value::Obj(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::Value as V;

    #[test]
    fn api_info_omits_absent_optionals() {
        let api = ApiInfo::new("gateway");
        let Value::Obj(obj) = api.to_value() else { panic!("expected object") };
        assert_eq!(obj.get("name"), Some(&V::Str("gateway".into())));
        assert!(!obj.contains_key("version"));
        assert!(!obj.contains_key("description"));
    }

    #[test]
    fn success_envelope_uses_payload_key_and_omits_absent_fields() {
        let api = ApiInfo::new("gateway");
        let data = V::List(vec![]);
        let links = V::Obj(BTreeMap::new());
        let envelope = success_envelope(&api, "widgets", data, None, links, None);
        let Value::Obj(obj) = envelope else { panic!("expected object") };
        assert!(obj.contains_key("widgets"));
        assert!(!obj.contains_key("data"));
        assert!(!obj.contains_key("meta"));
        assert!(!obj.contains_key("user"));
    }

    #[test]
    fn success_envelope_attaches_user_when_present() {
        let api = ApiInfo::new("gateway");
        let identity = Identity::new("u1").with_email(Some("a@b.com".into()));
        let envelope = success_envelope(&api, "data", V::Null, None, V::Obj(BTreeMap::new()), Some(&identity));
        let Value::Obj(obj) = envelope else { panic!("expected object") };
        let Some(Value::Obj(user)) = obj.get("user") else { panic!("expected user object") };
        assert_eq!(user.get("id"), Some(&V::Str("u1".into())));
        assert_eq!(user.get("email"), Some(&V::Str("a@b.com".into())));
    }

    #[test]
    fn error_envelope_has_no_payload_key() {
        let api = ApiInfo::new("gateway");
        let err = AppError::NotFound("missing".into());
        let envelope = error_envelope(&api, &err, V::Obj(BTreeMap::new()));
        let Value::Obj(obj) = envelope else { panic!("expected object") };
        assert!(!obj.contains_key("data"));
        let Some(Value::Obj(error)) = obj.get("error") else { panic!("expected error object") };
        assert_eq!(error.get("code"), Some(&V::Str("NOT_FOUND".into())));
    }
}
