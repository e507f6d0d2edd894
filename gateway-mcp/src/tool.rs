use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::AppError;
use serde_json::Value;

/// A handler behind a directly-callable tool: either an explicit MCP
/// config tool or a function-convention tool. Object-safe so the registry
/// can hold a uniform `Arc<dyn ToolHandler>` regardless of what backs it,
/// the same shape `gateway-store::Store` and `gateway-auth::AuthVerifier`
/// use for their own external collaborators.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> Result<Value, AppError>;
}

/// Where a route-only tool's REST counterpart lives, for the `tools/call`
/// rejection message (`"user/create"` style) and for documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    /// e.g. `"user/create"`, `"contact/search"`.
    pub path: String,
    pub method: &'static str,
}

impl fmt::Display for RouteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Whether a tool can be invoked directly through `tools/call` or only
/// describes a REST endpoint the caller must use instead.
#[derive(Clone)]
pub enum ToolKind {
    /// Has a handler; `tools/call` invokes it directly.
    Handler(Arc<dyn ToolHandler>),
    /// No handler; listed for discovery only. `tools/call` against one
    /// of these always fails, pointing the caller at `route`.
    RouteOnly(RouteRef),
}

/// One entry in the tool catalogue. Mirrors the MCP `tools/list` shape:
/// `name`, `description`, `inputSchema`, plus the optional
/// `outputSchema`/`examples`/`tests` the spec allows tools to carry.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Option<Value>,
    pub examples: Option<Value>,
    pub tests: Option<Value>,
    pub kind: ToolKind,
}

impl Tool {
    pub fn route_only(name: impl Into<String>, description: impl Into<String>, input_schema: Value, route: RouteRef) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema: None,
            examples: None,
            tests: None,
            kind: ToolKind::RouteOnly(route),
        }
    }

    pub fn with_handler(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema: None,
            examples: None,
            tests: None,
            kind: ToolKind::Handler(handler),
        }
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_examples(mut self, examples: Value) -> Self {
        self.examples = Some(examples);
        self
    }

    pub fn with_tests(mut self, tests: Value) -> Self {
        self.tests = Some(tests);
        self
    }

    pub fn is_route_only(&self) -> bool {
        matches!(self.kind, ToolKind::RouteOnly(_))
    }

    /// The `tools/list` descriptor: never exposes the handler or route
    /// internals, only what a caller needs to decide whether and how to
    /// call the tool.
    pub fn descriptor(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("name".to_string(), Value::String(self.name.clone()));
        obj.insert("description".to_string(), Value::String(self.description.clone()));
        obj.insert("inputSchema".to_string(), self.input_schema.clone());
        if let Some(schema) = &self.output_schema {
            obj.insert("outputSchema".to_string(), schema.clone());
        }
        if let Some(examples) = &self.examples {
            obj.insert("examples".to_string(), examples.clone());
        }
        if let Some(tests) = &self.tests {
            obj.insert("tests".to_string(), tests.clone());
        }
        obj.insert("routeOnly".to_string(), Value::Bool(self.is_route_only()));
        Value::Object(obj)
    }
}
