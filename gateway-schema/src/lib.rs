//! # gateway-schema — DSL parser, model graph, type registry, id codec
//!
//! Turns the terse schema DSL (`"string!"`, `"-> User.posts[]"`, …) into a
//! normalised, relation-resolved model graph, assigns stable
//! numeric ids to model types, and encodes/decodes opaque prefixed ids
//! ids.

pub mod error;
pub mod field;
pub mod ident;
pub mod model;
pub mod registry;
pub mod schema;
pub mod sqid;

pub use error::SchemaError;
pub use field::{FieldType, Format, ParsedField, RelationInfo, RelationKind};
pub use ident::is_valid_identifier;
pub use model::{pluralize, ParsedModel};
pub use registry::TypeRegistry;
pub use schema::{parse_schema, ParsedSchema};
pub use sqid::{DecodedId, SqidCodec};
