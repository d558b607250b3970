//! Custom mapping registry
//!
//! Custom mappings are registered against the declared type of a destination
//! field, optionally narrowed to one field name. Lookups prefer the
//! type-and-field entry over the type-only entry.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::functions::CustomMapping;
use crate::types::TypeKey;
use dashmap::DashMap;

type RegistryKey = (TypeKey, Option<String>);

#[derive(Debug, Default)]
pub struct CustomMappingRegistry {
    entries: DashMap<RegistryKey, CustomMapping>,
}

impl CustomMappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping, replacing any previous one for the same key
    pub fn register(&self, type_key: TypeKey, mapping: CustomMapping, field: Option<&str>) {
        let key = (type_key, field.map(str::to_string));
        if self.entries.insert(key, mapping).is_some() {
            tracing::debug!(
                destination = type_key.short_name(),
                field = field.unwrap_or("*"),
                "replaced custom mapping"
            );
        }
    }

    /// Register a mapping only when the key is free; returns whether it was added
    pub fn register_if_absent(&self, type_key: TypeKey, mapping: CustomMapping, field: Option<&str>) -> bool {
        let key = (type_key, field.map(str::to_string));
        match self.entries.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(mapping);
                true
            }
        }
    }

    /// Entry registered for exactly this key
    pub fn get(&self, type_key: TypeKey, field: Option<&str>) -> Option<CustomMapping> {
        self.entries
            .get(&(type_key, field.map(str::to_string)))
            .map(|entry| entry.value().clone())
    }

    /// Entries applying to `field`: the type-and-field entry before the type-only one
    pub fn candidates(&self, type_key: TypeKey, field: &str) -> Vec<CustomMapping> {
        self.get(type_key, Some(field))
            .into_iter()
            .chain(self.get(type_key, None))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn constant(text: &'static str) -> CustomMapping {
        CustomMapping::value(move |_, _| Ok(Some(FieldValue::from(text))))
    }

    fn produced(mapping: &CustomMapping) -> Option<String> {
        let mapper = crate::Mapper::new();
        let node = crate::source::TableNode::new();
        mapping
            .invoke(&mapper, &node, "x", false, Some(&crate::SourceValue::Null))
            .unwrap()
            .and_then(|v| v.to_text())
    }

    #[test]
    fn test_field_entry_comes_before_type_entry() {
        let registry = CustomMappingRegistry::new();
        let key = TypeKey::of::<String>();
        registry.register(key, constant("type"), None);
        registry.register(key, constant("field"), Some("Title"));

        let title: Vec<_> = registry.candidates(key, "Title").iter().map(produced).collect();
        assert_eq!(title, vec![Some("field".to_string()), Some("type".to_string())]);

        let summary: Vec<_> = registry.candidates(key, "Summary").iter().map(produced).collect();
        assert_eq!(summary, vec![Some("type".to_string())]);

        assert!(registry.candidates(TypeKey::of::<i32>(), "Title").is_empty());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = CustomMappingRegistry::new();
        let key = TypeKey::of::<String>();
        registry.register(key, constant("first"), None);
        registry.register(key, constant("second"), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(produced(&registry.get(key, None).unwrap()).as_deref(), Some("second"));
    }

    #[test]
    fn test_register_if_absent_keeps_existing() {
        let registry = CustomMappingRegistry::new();
        let key = TypeKey::of::<String>();
        assert!(registry.register_if_absent(key, constant("user"), None));
        assert!(!registry.register_if_absent(key, constant("built-in"), None));
        assert_eq!(produced(&registry.get(key, None).unwrap()).as_deref(), Some("user"));
    }
}
