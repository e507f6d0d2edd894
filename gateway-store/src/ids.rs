use std::time::{SystemTime, UNIX_EPOCH};

use gateway_schema::{ParsedModel, SqidCodec, TypeRegistry};

/// How the storage adapter mints an id for a create with no client-supplied
/// one. `Cuid` is the default (an opaque timestamp+random segment, no
/// registry lookup needed); `Sqid` encodes the model's type number through
/// `gateway-schema`'s seeded codec so the id round-trips to `{model,
/// typeNum, timestamp, random}` via [`SqidCodec::decode`].
#[derive(Clone)]
pub enum IdStrategy {
    Cuid,
    Sqid { codec: SqidCodec, registry: TypeRegistry },
}

impl IdStrategy {
    pub fn generate(&self, model: &ParsedModel) -> String {
        let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
        let random: u32 = rand::random();
        let body = match self {
            IdStrategy::Cuid => format!("{now_ms:x}{random:08x}"),
            IdStrategy::Sqid { codec, registry } => {
                let type_num = registry.type_num(&model.name).unwrap_or(0);
                codec.encode(type_num, None, now_ms, random)
            }
        };
        format!("{}_{body}", model.singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn model() -> ParsedModel {
        let raw: IndexMap<String, IndexMap<String, String>> =
            [("Customer".to_string(), [("name".to_string(), "string!".to_string())].into_iter().collect())]
                .into_iter()
                .collect();
        gateway_schema::parse_schema(&raw).unwrap().get("Customer").unwrap().clone()
    }

    #[test]
    fn cuid_ids_are_prefixed_and_unique() {
        let strategy = IdStrategy::Cuid;
        let m = model();
        let a = strategy.generate(&m);
        let b = strategy.generate(&m);
        assert!(a.starts_with("customer_"));
        assert_ne!(a, b);
    }

    #[test]
    fn sqid_ids_decode_back_to_model() {
        let raw: IndexMap<String, IndexMap<String, String>> =
            [("Customer".to_string(), [("name".to_string(), "string!".to_string())].into_iter().collect())]
                .into_iter()
                .collect();
        let schema = gateway_schema::parse_schema(&raw).unwrap();
        let registry = TypeRegistry::from_schema(&schema);
        let codec = SqidCodec::new(7, 8);
        let strategy = IdStrategy::Sqid { codec: codec.clone(), registry: registry.clone() };
        let m = model();
        let id = strategy.generate(&m);
        let decoded = codec.decode(&id, &registry).unwrap();
        assert_eq!(decoded.model, "Customer");
    }
}
