//! # gateway-store — storage adapter contract and document model
//!
//! The `Store` trait is the gateway's persistence boundary: an external
//! collaborator the rest of the system is built against, not implemented
//! here for production use. This crate owns the `Document`/`Meta` shape,
//! the storage-adapter behavioural contracts (system-field stripping,
//! audit stamping, the user-id fallback lookup, text search), an id
//! generation strategy, and a `DashMap`-backed in-memory `Store` to serve
//! as the default development/test backend.

pub mod adapter;
pub mod document;
pub mod error;
pub mod ids;
pub mod memory;
pub mod provider;
pub mod store;

pub use adapter::StorageAdapter;
pub use document::{entity_to_document, format_entity, partition_meta, Document, Meta, META_FIELDS};
pub use error::StoreError;
pub use ids::IdStrategy;
pub use memory::InMemoryStore;
pub use provider::{PerTenantStores, SingleTenantStore, StoreProvider};
pub use store::{DeleteResult, FindOptions, FindResult, Store};
