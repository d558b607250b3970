//! The mapper and its configuration
//!
//! [`Mapper`] is the entry point: it owns the descriptor cache, the custom
//! mapping registry, the named function table and the optional dictionary
//! collaborator. Build one with [`Mapper::builder`], then call [`Mapper::map`]
//! or [`Mapper::map_collection`] with any [`ContentNode`] source.
//!
//! ```
//! use contentmap_core::source::{ContentItem, ContentTree};
//! use contentmap_core::{mappable, FieldOverride, Mapper, OverrideSet};
//!
//! #[derive(Debug, Default)]
//! struct Page {
//!     id: i64,
//!     name: String,
//!     parent_id: i64,
//! }
//!
//! mappable! {
//!     Page {
//!         Id => id,
//!         Name => name,
//!         ParentId => parent_id,
//!     }
//! }
//!
//! let tree = ContentTree::from_items(vec![
//!     ContentItem::new(1001, "Home"),
//!     ContentItem::new(1000, "About").parent(1001),
//! ]);
//! let node = tree.node(1000).unwrap();
//!
//! let overrides = OverrideSet::new().with("ParentId", FieldOverride::new().source("Id").levels_above(1));
//! let mut page = Page::default();
//! Mapper::new().map(node.as_ref(), &mut page, &overrides).unwrap();
//!
//! assert_eq!(page.name, "About");
//! assert_eq!(page.parent_id, 1001);
//! ```
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod cache;
pub mod coercion;
mod collection;
mod composition;
mod engine;
pub mod functions;
pub mod overrides;
pub mod registry;

pub use cache::DescriptorCache;
pub use collection::CollectionOptions;
pub use functions::{CustomMapping, Formatter, FunctionTable, ValueGetter};
pub use overrides::{Concatenation, FieldOverride, OverrideSet, PropertyCondition};
pub use registry::CustomMappingRegistry;

use crate::config::MapperConfig;
use crate::error::Result;
use crate::model::{CollectionTarget, FileReference, MapTarget};
use crate::source::{ContentNode, DictionaryLookup, JsonNode, NodeRef, TableNode, XmlNode};
use crate::types::{PropertySet, TypeKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Convention-based object mapper
pub struct Mapper {
    config: MapperConfig,
    cache: Arc<DescriptorCache>,
    registry: CustomMappingRegistry,
    functions: FunctionTable,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
}

impl Mapper {
    /// Mapper with the default configuration and built-in mappings
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    pub fn registry(&self) -> &CustomMappingRegistry {
        &self.registry
    }

    /// Register a custom mapping for fields declared as `T`
    ///
    /// With a field name the mapping only applies to that field; otherwise it
    /// applies to every field of type `T`. A later registration for the same
    /// key replaces this one.
    pub fn add_custom_mapping<T: ?Sized + 'static>(&self, mapping: CustomMapping, field: Option<&str>) {
        self.registry.register(TypeKey::of::<T>(), mapping, field);
    }

    /// Map `source` onto `destination`
    pub fn map(&self, source: &dyn ContentNode, destination: &mut dyn MapTarget, overrides: &OverrideSet) -> Result<()> {
        self.map_with(source, destination, overrides, PropertySet::All)
    }

    /// Map only the fields whose value origin is allowed by `property_set`
    pub fn map_with(
        &self,
        source: &dyn ContentNode,
        destination: &mut dyn MapTarget,
        overrides: &OverrideSet,
        property_set: PropertySet,
    ) -> Result<()> {
        self.map_target(source, destination, overrides, property_set)
    }

    /// Reconcile `sources` into `destination` using the configured options
    ///
    /// With `clear_before_mapping` off, items whose identity matches a source
    /// are updated in place, so a repeated call only grows the list for item
    /// types without the identity field.
    pub fn map_collection(
        &self,
        sources: &[NodeRef],
        destination: &mut dyn CollectionTarget,
        overrides: &OverrideSet,
    ) -> Result<()> {
        self.map_collection_with(sources, destination, overrides, &self.collection_options())
    }

    pub fn map_collection_with(
        &self,
        sources: &[NodeRef],
        destination: &mut dyn CollectionTarget,
        overrides: &OverrideSet,
        options: &CollectionOptions,
    ) -> Result<()> {
        collection::reconcile(self, sources, destination, overrides, options, PropertySet::All)
    }

    /// Map a JSON object document
    pub fn map_json(&self, json: &str, destination: &mut dyn MapTarget, overrides: &OverrideSet) -> Result<()> {
        let node = JsonNode::parse_with(json, self.config.case_insensitive_documents)?;
        self.map(node.as_ref(), destination, overrides)
    }

    /// Map an XML fragment
    pub fn map_xml(&self, xml: &str, destination: &mut dyn MapTarget, overrides: &OverrideSet) -> Result<()> {
        let node = XmlNode::parse_with(xml, self.config.case_insensitive_documents)?;
        self.map(node.as_ref(), destination, overrides)
    }

    /// Map a string-keyed table
    pub fn map_table(
        &self,
        table: &HashMap<String, String>,
        destination: &mut dyn MapTarget,
        overrides: &OverrideSet,
    ) -> Result<()> {
        let node = TableNode::from(table.clone());
        self.map(&node, destination, overrides)
    }

    /// Reconcile the items of a JSON array document
    pub fn map_collection_json(
        &self,
        json: &str,
        destination: &mut dyn CollectionTarget,
        overrides: &OverrideSet,
    ) -> Result<()> {
        let items = JsonNode::parse_collection_with(json, self.config.case_insensitive_documents)?;
        self.map_collection(&items, destination, overrides)
    }

    /// Reconcile the child elements of an XML fragment's root
    pub fn map_collection_xml(
        &self,
        xml: &str,
        destination: &mut dyn CollectionTarget,
        overrides: &OverrideSet,
    ) -> Result<()> {
        let items = XmlNode::parse_collection_with(xml, self.config.case_insensitive_documents)?;
        self.map_collection(&items, destination, overrides)
    }

    pub(crate) fn collection_options(&self) -> CollectionOptions {
        CollectionOptions::from_config(&self.config)
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("cached_types", &self.cache.len())
            .field("custom_mappings", &self.registry.len())
            .field("functions", &self.functions.len())
            .field("has_dictionary", &self.dictionary.is_some())
            .finish()
    }
}

/// Builder for [`Mapper`]
#[derive(Default)]
pub struct MapperBuilder {
    config: MapperConfig,
    cache: Option<Arc<DescriptorCache>>,
    mappings: Vec<(TypeKey, Option<String>, CustomMapping)>,
    functions: FunctionTable,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a descriptor cache between mappers
    ///
    /// Without one the mapper creates its own, enabled per the configuration.
    pub fn with_cache(mut self, cache: Arc<DescriptorCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a custom mapping for fields declared as `T`
    pub fn with_custom_mapping<T: ?Sized + 'static>(mut self, mapping: CustomMapping, field: Option<&str>) -> Self {
        self.mappings.push((TypeKey::of::<T>(), field.map(str::to_string), mapping));
        self
    }

    /// Name a formatter for use in declarative overrides
    pub fn with_formatter<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.functions.add_formatter(name, Formatter::new(formatter));
        self
    }

    /// Name a custom mapping for use in declarative overrides
    pub fn with_named_mapping(mut self, name: impl Into<String>, mapping: CustomMapping) -> Self {
        self.functions.add_mapping(name, mapping);
        self
    }

    /// Name a value getter for use in declarative overrides
    pub fn with_value_getter(mut self, name: impl Into<String>, getter: ValueGetter) -> Self {
        self.functions.add_value_getter(name, getter);
        self
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionaryLookup>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Build the mapper, seeding built-in mappings where no user mapping exists
    pub fn build(self) -> Mapper {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(DescriptorCache::new(self.config.enable_cache)));

        let registry = CustomMappingRegistry::new();
        for (type_key, field, mapping) in self.mappings {
            registry.register(type_key, mapping, field.as_deref());
        }
        registry.register_if_absent(TypeKey::of::<FileReference>(), built_in::file_reference(), None);

        tracing::debug!(
            cache_enabled = cache.is_enabled(),
            custom_mappings = registry.len(),
            functions = self.functions.len(),
            "built mapper"
        );

        Mapper {
            config: self.config,
            cache,
            registry,
            functions: self.functions,
            dictionary: self.dictionary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    #[test]
    fn test_builder_seeds_file_mapping() {
        let mapper = Mapper::new();
        assert!(mapper.registry().get(TypeKey::of::<FileReference>(), None).is_some());
        assert!(mapper.cache().is_enabled());
    }

    #[test]
    fn test_user_file_mapping_is_not_replaced() {
        let mapper = Mapper::builder()
            .with_custom_mapping::<FileReference>(
                CustomMapping::value(|_, _| Ok(Some(FieldValue::object(FileReference::default())))),
                None,
            )
            .build();
        let mapping = mapper.registry().get(TypeKey::of::<FileReference>(), None).unwrap();
        assert!(matches!(mapping, CustomMapping::Value(_)));
    }

    #[test]
    fn test_cache_follows_config_unless_injected() {
        let mapper = Mapper::builder()
            .with_config(MapperConfig::default().without_cache())
            .build();
        assert!(!mapper.cache().is_enabled());

        let shared = Arc::new(DescriptorCache::new(true));
        let first = Mapper::builder().with_cache(Arc::clone(&shared)).build();
        let second = Mapper::builder().with_cache(Arc::clone(&shared)).build();
        assert!(Arc::ptr_eq(first.cache(), second.cache()));
    }

    #[test]
    fn test_mapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mapper>();
    }
}
