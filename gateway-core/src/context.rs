/// Per-request context attached by middleware and threaded through to the
/// storage adapter for audit-field stamping.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub request_id: String,
    pub tenant: Option<String>,
    pub base_url: String,
    pub ray: Option<String>,
    pub colo: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            user_id: None,
            request_id: request_id.into(),
            tenant: None,
            base_url: base_url.into(),
            ray: None,
            colo: None,
        }
    }

    pub fn with_tenant(mut self, tenant: Option<String>) -> Self {
        self.tenant = tenant;
        self
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}
