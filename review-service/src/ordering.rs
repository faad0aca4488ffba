use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use sos_client::domain::ReadingTable;

use crate::store::ReadingStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderKey {
    pub database: String,
    pub table: ReadingTable,
}

/// Master-table display orders, loaded on first use and kept until
/// explicitly invalidated.
///
/// Two requests racing on a cold key both load it; the lists are equal, so
/// whichever insert lands last is as good as the first.
#[derive(Default)]
pub struct OrderCache {
    entries: RwLock<HashMap<OrderKey, Arc<Vec<String>>>>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(
        &self,
        store: &dyn ReadingStore,
        table: ReadingTable,
    ) -> anyhow::Result<Arc<Vec<String>>> {
        let key = OrderKey {
            database: store.database_key().to_string(),
            table,
        };

        if let Some(order) = self.cached(&key) {
            return Ok(order);
        }

        let order = Arc::new(store.display_order(table).await?);
        tracing::debug!(%table, database = %key.database, codes = order.len(), "display order cached");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&order));
        Ok(order)
    }

    /// Drops one cached list so the next request reloads it.
    pub fn invalidate(&self, key: &OrderKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn cached(&self, key: &OrderKey) -> Option<Arc<Vec<String>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Stable sort of `records` by the position of their code in `order`.
/// Codes missing from `order` keep their relative order after all listed ones.
pub fn sort_by_order<T, F>(records: &mut [T], order: &[String], code_of: F)
where
    F: Fn(&T) -> &str,
{
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, code)| (code.as_str(), i))
        .collect();

    records.sort_by_key(|r| rank.get(code_of(r)).copied().unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn codes(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn listed_codes_follow_master_order_and_unlisted_trail_in_input_order() {
        let order = codes(&["A", "B", "C"]);
        let mut records = codes(&["X", "C", "Y", "A", "B"]);

        sort_by_order(&mut records, &order, |r| r.as_str());

        assert_eq!(records, codes(&["A", "B", "C", "X", "Y"]));
    }

    #[test]
    fn empty_order_keeps_input_order() {
        let mut records = codes(&["Z", "A", "M"]);
        sort_by_order(&mut records, &[], |r| r.as_str());
        assert_eq!(records, codes(&["Z", "A", "M"]));
    }

    #[tokio::test]
    async fn order_is_loaded_once_per_table_until_invalidated() {
        let store = MemoryStore::new()
            .with_order(ReadingTable::Ht, ["F1", "F2"])
            .with_order(ReadingTable::Tf, ["T1"]);
        let cache = OrderCache::new();

        let first = cache.get_or_load(&store, ReadingTable::Ht).await.unwrap();
        let second = cache.get_or_load(&store, ReadingTable::Ht).await.unwrap();
        assert_eq!(*first, codes(&["F1", "F2"]));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.order_loads(), 1);

        cache.get_or_load(&store, ReadingTable::Tf).await.unwrap();
        assert_eq!(store.order_loads(), 2);

        let key = OrderKey {
            database: "memory".to_string(),
            table: ReadingTable::Ht,
        };
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        cache.get_or_load(&store, ReadingTable::Ht).await.unwrap();
        assert_eq!(store.order_loads(), 3);

        cache.invalidate_all();
        cache.get_or_load(&store, ReadingTable::Tf).await.unwrap();
        assert_eq!(store.order_loads(), 4);
    }
}
