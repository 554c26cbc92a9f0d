use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::monitor::module::DataPoints;

/// Latest metrics of every alive module that has ticked since it started.
///
/// Written only by the scheduler, read from anywhere. Values are stored as
/// `Arc<DataPoints>` and replaced wholesale, so a reader holding a snapshot
/// never observes a partial update.
#[derive(Debug, Default)]
pub struct AggregationStore {
    entries: RwLock<BTreeMap<String, Arc<DataPoints>>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<DataPoints>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Replaces the value for `key`; never merges with the previous one.
    pub fn put(&self, key: &str, points: DataPoints) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Arc::new(points));
    }

    pub fn remove(&self, key: &str) -> Option<Arc<DataPoints>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Currently populated keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
