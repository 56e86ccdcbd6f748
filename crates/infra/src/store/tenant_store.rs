use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use stockpack_core::TenantId;

/// Tenant-isolated key/value table for inventory records.
///
/// Every read and write is scoped to one tenant; a record written for tenant A
/// is never returned to tenant B.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn list(&self, tenant_id: TenantId) -> Vec<V>;

    /// Write several records as one batch.
    fn upsert_many(&self, tenant_id: TenantId, entries: Vec<(K, V)>) {
        for (key, value) in entries {
            self.upsert(tenant_id, key, value);
        }
    }
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn upsert_many(&self, tenant_id: TenantId, entries: Vec<(K, V)>) {
        (**self).upsert_many(tenant_id, entries)
    }
}

/// In-memory tenant-isolated table for tests/dev.
///
/// `list` returns records in insertion order.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<Table<K, V>>,
}

#[derive(Debug)]
struct Table<K, V> {
    rows: HashMap<(TenantId, K), V>,
    order: Vec<(TenantId, K)>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table {
                rows: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Table<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, tenant_id: TenantId, key: K, value: V) {
        let row_key = (tenant_id, key);
        if self.rows.insert(row_key.clone(), value).is_none() {
            self.order.push(row_key);
        }
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let table = self.inner.read().ok()?;
        table.rows.get(&(tenant_id, key.clone())).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        if let Ok(mut table) = self.inner.write() {
            table.insert(tenant_id, key, value);
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let table = match self.inner.read() {
            Ok(t) => t,
            Err(_) => return vec![],
        };

        table
            .order
            .iter()
            .filter(|(t, _)| *t == tenant_id)
            .filter_map(|row_key| table.rows.get(row_key).cloned())
            .collect()
    }

    fn upsert_many(&self, tenant_id: TenantId, entries: Vec<(K, V)>) {
        if let Ok(mut table) = self.inner.write() {
            for (key, value) in entries {
                table.insert(tenant_id, key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_isolated_per_tenant() {
        let store: InMemoryTenantStore<u32, String> = InMemoryTenantStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        store.upsert(tenant_a, 1, "TEST_PACKAGE_001".to_string());

        assert_eq!(store.get(tenant_a, &1).as_deref(), Some("TEST_PACKAGE_001"));
        assert_eq!(store.get(tenant_b, &1), None);
        assert!(store.list(tenant_b).is_empty());
    }

    #[test]
    fn list_keeps_insertion_order_and_upsert_replaces() {
        let store: InMemoryTenantStore<u32, &'static str> = InMemoryTenantStore::new();
        let tenant_id = TenantId::new();

        store.upsert_many(tenant_id, vec![(3, "c"), (1, "a"), (2, "b")]);
        store.upsert(tenant_id, 1, "a2");

        assert_eq!(store.list(tenant_id), vec!["c", "a2", "b"]);
    }
}
