//! Field descriptor cache
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use crate::model::{FieldDescriptor, MapTarget};
use crate::types::TypeKey;
use dashmap::DashMap;
use std::sync::Arc;

/// Settable field descriptors per destination type
///
/// Entries are computed on first use and live as long as the cache. A disabled
/// cache recomputes the list on every call. The map is sharded, so reading one
/// type's entry never blocks a writer populating another.
#[derive(Debug)]
pub struct DescriptorCache {
    entries: DashMap<TypeKey, Arc<[FieldDescriptor]>>,
    enabled: bool,
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DescriptorCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
        }
    }

    /// Settable fields of the target's type, in declaration order
    pub fn settable_fields(&self, target: &dyn MapTarget) -> Arc<[FieldDescriptor]> {
        if !self.enabled {
            return compute(target);
        }

        let key = target.type_key();
        if let Some(fields) = self.entries.get(&key) {
            return Arc::clone(&fields);
        }

        tracing::trace!(destination = key.short_name(), "caching field descriptors");
        let entry = self.entries.entry(key).or_insert_with(|| compute(target));
        Arc::clone(entry.value())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn compute(target: &dyn MapTarget) -> Arc<[FieldDescriptor]> {
    target
        .describe()
        .into_iter()
        .filter(|field| field.settable)
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, Default)]
    struct Teaser {
        id: i64,
        title: String,
        length: u32,
    }

    crate::mappable! {
        Teaser {
            Id => id,
            Title => title,
        }
        computed {
            Length => length,
        }
    }

    #[test]
    fn test_only_settable_fields() {
        let cache = DescriptorCache::default();
        let fields = cache.settable_fields(&Teaser::default());
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Id", "Title"]);
    }

    #[test]
    fn test_entry_is_shared_across_instances() {
        let cache = DescriptorCache::new(true);
        let first = cache.settable_fields(&Teaser::default());
        let second = cache.settable_fields(&Teaser {
            id: 5,
            ..Teaser::default()
        });
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&TypeKey::of::<Teaser>()));
    }

    #[test]
    fn test_disabled_cache_recomputes() {
        let cache = DescriptorCache::new(false);
        let first = cache.settable_fields(&Teaser::default());
        let second = cache.settable_fields(&Teaser::default());
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_population() {
        let cache = Arc::new(DescriptorCache::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.settable_fields(&Teaser::default()).len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
        assert_eq!(cache.len(), 1);
    }
}
