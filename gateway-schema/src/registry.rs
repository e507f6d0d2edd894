use indexmap::IndexMap;

use crate::schema::ParsedSchema;

/// Assigns a small positive integer to each model name.
///
/// Explicit mappings are respected; implicit assignments pick
/// `max(existing)+1` in schema iteration order, so the registry is stable
/// across restarts for a given schema (same iteration order in, same
/// numbers out).
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    forward: IndexMap<String, u32>,
    reverse: IndexMap<u32, String>,
}

impl TypeRegistry {
    /// Build a registry from a parsed schema, assigning ids in iteration
    /// order starting at 1.
    pub fn from_schema(schema: &ParsedSchema) -> Self {
        let mut registry = Self { forward: IndexMap::new(), reverse: IndexMap::new() };
        for model_name in schema.keys() {
            registry.assign(model_name);
        }
        registry
    }

    /// Assign an explicit type number, as if read from `$id`-style
    /// schema metadata. Panics on a duplicate number — callers are
    /// expected to validate uniqueness of explicit assignments up front.
    pub fn with_explicit(mut self, model_name: &str, type_num: u32) -> Self {
        assert!(!self.reverse.contains_key(&type_num), "duplicate explicit type number {type_num}");
        self.forward.insert(model_name.to_string(), type_num);
        self.reverse.insert(type_num, model_name.to_string());
        self
    }

    fn assign(&mut self, model_name: &str) -> u32 {
        if let Some(existing) = self.forward.get(model_name) {
            return *existing;
        }
        let next = self.reverse.keys().max().copied().unwrap_or(0) + 1;
        self.forward.insert(model_name.to_string(), next);
        self.reverse.insert(next, model_name.to_string());
        next
    }

    pub fn type_num(&self, model_name: &str) -> Option<u32> {
        self.forward.get(model_name).copied()
    }

    pub fn model_name(&self, type_num: u32) -> Option<&str> {
        self.reverse.get(&type_num).map(|s| s.as_str())
    }
}
