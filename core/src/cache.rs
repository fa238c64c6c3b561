//! Opt-in cache of list entity types.
//!
//! Entity types only change when a list is renamed or recreated, so a
//! session may keep them for a bounded time instead of asking on every
//! write. Entries expire after the configured TTL and can be dropped early
//! with `invalidate`.

use std::time::Duration;

use moka::sync::Cache;

use crate::types::EntityType;

const MAX_LISTS: u64 = 1_024;

#[derive(Clone)]
pub struct MetadataCache {
    entries: Cache<String, EntityType>,
}

impl MetadataCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_LISTS)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    pub fn get(&self, list: &str) -> Option<EntityType> {
        self.entries.get(list)
    }

    pub fn insert(&self, list: &str, entity_type: EntityType) {
        self.entries.insert(list.to_string(), entity_type);
    }

    pub fn invalidate(&self, list: &str) {
        self.entries.invalidate(list);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
