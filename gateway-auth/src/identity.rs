use std::collections::BTreeMap;

use serde_json::Value;

/// The authenticated caller, however their identity was established:
/// a verified JWT, a trusted snippet header, or (when `trustUnverified`
/// is on) a JWT decoded without checking its signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// The full claim set, for handlers that need more than the
    /// three fields above.
    pub claims: BTreeMap<String, Value>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), email: None, name: None, claims: BTreeMap::new() }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let id = Identity::new("u1").with_email(Some("a@b.com".into())).with_name(Some("A".into()));
        assert_eq!(id.user_id, "u1");
        assert_eq!(id.email.as_deref(), Some("a@b.com"));
        assert_eq!(id.name.as_deref(), Some("A"));
        assert!(id.claims.is_empty());
    }
}
