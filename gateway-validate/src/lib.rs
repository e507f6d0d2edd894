//! # gateway-validate — JSON Schema generation and document validation
//!
//! Turns a [`gateway_schema::ParsedModel`] into a JSON-Schema-ish document
//! for clients/MCP tool parameters, and checks request bodies against the
//! same model before they reach storage.

pub mod error;
pub mod schema;
pub mod validate;

pub use error::ValidationErrors;
pub use schema::build_json_schema;
pub use validate::validate_document;
