use std::collections::BTreeMap;

use async_trait::async_trait;
use gateway_core::Value;
use gateway_filter::FilterAst;
use indexmap::IndexMap;

use crate::document::Document;
use crate::error::StoreError;

/// Pagination and ordering for [`Store::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub limit: usize,
    pub offset: usize,
    pub sort: Option<IndexMap<String, i8>>,
}

/// Result of a [`Store::find`] call.
#[derive(Debug, Clone)]
pub struct FindResult {
    pub items: Vec<Document>,
    pub total: u64,
    pub has_more: bool,
}

/// Result of a [`Store::delete`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// The persistence engine the gateway is built against — an external
/// collaborator per the component boundary, not something this crate
/// implements for production use. `model_type` is always a bare plural
/// collection name; tenant isolation is the caller's responsibility
/// (one `Store` instance per tenant), not this trait's.
///
/// `create`/`update` take a flat field bag where any of the canonical
/// meta field names (`id`, `type`, `version`, `createdAt`, `updatedAt`,
/// `createdBy`, `updatedBy`, `deletedAt`, `deletedBy`, `context`) present
/// is a meta instruction rather than a user field — see
/// [`crate::document::partition_meta`]. Callers that want authoritative
/// values (timestamps, version bump, audit stamps) go through
/// [`crate::adapter::StorageAdapter`] rather than this trait directly.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, model_type: &str, filter: Option<&FilterAst>, opts: FindOptions) -> Result<FindResult, StoreError>;

    async fn get(&self, model_type: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Assigns `version=1`, `createdAt`/`updatedAt=now`. Fails with
    /// [`StoreError::Conflict`] if `id` already names an existing
    /// document (deleted or not) in this collection.
    async fn create(&self, model_type: &str, data: BTreeMap<String, Value>) -> Result<Document, StoreError>;

    /// Shallow-merges `set` into the existing document's fields, bumps
    /// `version`, sets `updatedAt=now`. Returns `None` if `id` doesn't
    /// name a live (non-deleted) document.
    async fn update(&self, model_type: &str, id: &str, set: BTreeMap<String, Value>) -> Result<Option<Document>, StoreError>;

    /// Soft-deletes: sets `deletedAt=now`, `deletedBy=actor`. Returns
    /// `deleted_count=0` without error if `id` doesn't name a live
    /// document.
    async fn delete(&self, model_type: &str, id: &str, actor: Option<String>) -> Result<DeleteResult, StoreError>;

    async fn count(&self, model_type: &str, filter: Option<&FilterAst>) -> Result<u64, StoreError>;
}
