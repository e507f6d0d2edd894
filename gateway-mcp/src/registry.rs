use indexmap::IndexMap;

use crate::tool::Tool;

/// Process-wide `toolName → Tool` mapping, aggregated at startup from
/// explicit MCP config tools, per-model derived tools, and
/// function-convention tools, in that priority order — but the mapping
/// itself doesn't care about provenance, only about names. Built once
/// and never mutated in steady state, the same "populated at startup,
/// immutable after" lifecycle as `gateway-schema::TypeRegistry`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: IndexMap::new() }
    }

    /// Register a tool. Last registration for a given name wins — a later
    /// call with the same `name` silently replaces the earlier one,
    /// preserving that name's original position in iteration order.
    pub fn register(&mut self, tool: Tool) {
        if let Some(slot) = self.tools.get_mut(&tool.name) {
            *slot = tool;
        } else {
            self.tools.insert(tool.name.clone(), tool);
        }
    }

    pub fn register_all(&mut self, tools: impl IntoIterator<Item = Tool>) {
        for tool in tools {
            self.register(tool);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::RouteRef;
    use serde_json::json;

    fn route_tool(name: &str, path: &str) -> Tool {
        Tool::route_only(name, "test tool", json!({"type": "object"}), RouteRef { path: path.to_string(), method: "POST" })
    }

    #[test]
    fn later_registration_wins_and_keeps_original_position() {
        let mut registry = ToolRegistry::new();
        registry.register(route_tool("a", "a/create"));
        registry.register(route_tool("b", "b/create"));
        registry.register(route_tool("a", "a/replace"));

        let names: Vec<&str> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let ToolKindCheck(path) = route_path(registry.get("a").unwrap());
        assert_eq!(path, "a/replace");
    }

    struct ToolKindCheck(String);

    fn route_path(tool: &Tool) -> ToolKindCheck {
        match &tool.kind {
            crate::tool::ToolKind::RouteOnly(r) => ToolKindCheck(r.path.clone()),
            _ => panic!("expected route-only tool"),
        }
    }

    #[test]
    fn unregistered_name_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nope").is_none());
    }
}
