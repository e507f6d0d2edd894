use std::sync::Arc;

use dashmap::DashMap;

use crate::store::Store;

/// Resolves the per-tenant `Store` handle the router needs at request
/// entry. Tenant scoping is an external concern per the storage-adapter
/// boundary: this trait only decides *which* `Store` a request sees, it
/// never itself implements isolation.
pub trait StoreProvider: Send + Sync {
    fn store_for(&self, tenant: Option<&str>) -> Arc<dyn Store>;
}

/// The common case: one store for every tenant (or no multi-tenancy at
/// all). Every call returns the same handle.
pub struct SingleTenantStore(Arc<dyn Store>);

impl SingleTenantStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self(store)
    }
}

impl StoreProvider for SingleTenantStore {
    fn store_for(&self, _tenant: Option<&str>) -> Arc<dyn Store> {
        self.0.clone()
    }
}

/// Lazily creates and caches one `Store` per tenant slug via a factory
/// closure, plus one root-scope store for requests with no tenant.
/// Grounded on the same `DashMap`-of-collections shape `InMemoryStore`
/// uses for collections, one level up: a map of tenant slug to store.
pub struct PerTenantStores {
    factory: Arc<dyn Fn() -> Arc<dyn Store> + Send + Sync>,
    stores: DashMap<String, Arc<dyn Store>>,
    root: Arc<dyn Store>,
}

impl PerTenantStores {
    pub fn new(factory: Arc<dyn Fn() -> Arc<dyn Store> + Send + Sync>) -> Self {
        let root = factory();
        Self { factory, stores: DashMap::new(), root }
    }
}

impl StoreProvider for PerTenantStores {
    fn store_for(&self, tenant: Option<&str>) -> Arc<dyn Store> {
        match tenant {
            None => self.root.clone(),
            Some(slug) => self.stores.entry(slug.to_string()).or_insert_with(|| (self.factory)()).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[test]
    fn single_tenant_always_returns_same_handle() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let provider = SingleTenantStore::new(store.clone());
        assert!(Arc::ptr_eq(&provider.store_for(None), &store));
        assert!(Arc::ptr_eq(&provider.store_for(Some("acme")), &store));
    }

    #[test]
    fn per_tenant_caches_distinct_stores() {
        let provider = PerTenantStores::new(Arc::new(|| Arc::new(InMemoryStore::new()) as Arc<dyn Store>));
        let acme_first = provider.store_for(Some("acme"));
        let acme_second = provider.store_for(Some("acme"));
        let globex = provider.store_for(Some("globex"));
        assert!(Arc::ptr_eq(&acme_first, &acme_second));
        assert!(!Arc::ptr_eq(&acme_first, &globex));
    }

    #[test]
    fn root_scope_is_distinct_from_any_tenant() {
        let provider = PerTenantStores::new(Arc::new(|| Arc::new(InMemoryStore::new()) as Arc<dyn Store>));
        let root = provider.store_for(None);
        let tenant = provider.store_for(Some("acme"));
        assert!(!Arc::ptr_eq(&root, &tenant));
    }
}
