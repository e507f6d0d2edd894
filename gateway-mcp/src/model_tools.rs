use gateway_schema::{ParsedModel, ParsedSchema};
use gateway_validate::build_json_schema;
use serde_json::{json, Value};

use crate::tool::{RouteRef, Tool};

const VERBS: &[&str] = &["create", "get", "list", "search", "update", "delete"];

fn rest_route(model: &ParsedModel, verb: &str) -> RouteRef {
    let plural = &model.plural;
    let (method, path) = match verb {
        "create" => ("POST", format!("{plural}")),
        "get" => ("GET", format!("{plural}/:id")),
        "list" => ("GET", format!("{plural}")),
        "search" => ("GET", format!("{plural}/search")),
        "update" => ("PATCH", format!("{plural}/:id")),
        "delete" => ("DELETE", format!("{plural}/:id")),
        _ => unreachable!("VERBS is exhaustive"),
    };
    RouteRef { path: format!("{}/{verb}", model.singular), method }
}

fn id_schema() -> Value {
    json!({ "type": "object", "properties": { "id": { "type": "string" } }, "required": ["id"] })
}

fn list_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "filter": { "type": "object" },
            "sort": { "type": "string" },
            "limit": { "type": "integer" },
            "offset": { "type": "integer" },
        },
    })
}

fn search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "q": { "type": "string" },
            "limit": { "type": "integer" },
            "offset": { "type": "integer" },
        },
        "required": ["q"],
    })
}

fn partial_schema(model: &ParsedModel) -> Value {
    let mut schema = build_json_schema(model);
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("required");
    }
    schema
}

fn input_schema_for(model: &ParsedModel, verb: &str) -> Value {
    match verb {
        "create" => build_json_schema(model),
        "get" | "delete" => id_schema(),
        "list" => list_schema(),
        "search" => search_schema(),
        "update" => partial_schema(model),
        _ => unreachable!("VERBS is exhaustive"),
    }
}

fn description_for(model: &ParsedModel, verb: &str) -> String {
    match verb {
        "create" => format!("Create a new {}.", model.name),
        "get" => format!("Fetch a single {} by id.", model.name),
        "list" => format!("List {} with optional filter/sort/pagination.", model.plural),
        "search" => format!("Full-text-ish search over {}.", model.plural),
        "update" => format!("Partially update a {} by id.", model.name),
        "delete" => format!("Soft-delete a {} by id.", model.name),
        _ => unreachable!("VERBS is exhaustive"),
    }
}

/// Derive the route-only tool set for one model: `{singular}.{verb}` for
/// each of the six canonical REST operations. Every one is marked
/// route-only — `tools/call` against it must be rejected pointing at the
/// REST endpoint, per the spec's "derived tools have no handler" rule.
pub fn model_tools(model: &ParsedModel, prefix: Option<&str>) -> Vec<Tool> {
    let prefix = prefix.unwrap_or("");
    VERBS
        .iter()
        .map(|verb| {
            let name = format!("{prefix}{}.{verb}", model.singular);
            Tool::route_only(name, description_for(model, verb), input_schema_for(model, verb), rest_route(model, verb))
        })
        .collect()
}

/// Derive tools for every model in a schema, in schema iteration order.
pub fn schema_tools(schema: &ParsedSchema, prefix: Option<&str>) -> Vec<Tool> {
    schema.values().flat_map(|model| model_tools(model, prefix)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn schema() -> ParsedSchema {
        let raw: IndexMap<String, IndexMap<String, String>> = [(
            "Contact".to_string(),
            [("name".to_string(), "string!".to_string())].into_iter().collect(),
        )]
        .into_iter()
        .collect();
        gateway_schema::parse_schema(&raw).unwrap()
    }

    #[test]
    fn derives_six_tools_per_model() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        let tools = model_tools(model, None);
        assert_eq!(tools.len(), 6);
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["contact.create", "contact.get", "contact.list", "contact.search", "contact.update", "contact.delete"]);
    }

    #[test]
    fn every_derived_tool_is_route_only() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        for tool in model_tools(model, None) {
            assert!(tool.is_route_only());
        }
    }

    #[test]
    fn route_path_matches_singular_slash_verb() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        let create = model_tools(model, None).into_iter().find(|t| t.name == "contact.create").unwrap();
        match create.kind {
            crate::tool::ToolKind::RouteOnly(ref route) => assert_eq!(route.path, "contact/create"),
            _ => panic!("expected route-only"),
        }
    }

    #[test]
    fn prefix_is_prepended_to_name_only() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        let tools = model_tools(model, Some("crm_"));
        assert_eq!(tools[0].name, "crm_contact.create");
        match tools[0].kind {
            crate::tool::ToolKind::RouteOnly(ref route) => assert_eq!(route.path, "contact/create"),
            _ => panic!("expected route-only"),
        }
    }

    #[test]
    fn create_schema_carries_required_fields() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        let create = model_tools(model, None).into_iter().find(|t| t.name == "contact.create").unwrap();
        let required = create.input_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "name"));
    }

    #[test]
    fn update_schema_drops_required() {
        let schema = schema();
        let model = schema.get("Contact").unwrap();
        let update = model_tools(model, None).into_iter().find(|t| t.name == "contact.update").unwrap();
        assert!(update.input_schema.get("required").is_none());
    }
}
