//! Collection reconciliation
//!
//! Merges a sequence of source nodes into an existing destination list. Each
//! source item is matched against the destination items by an identity field
//! (case-insensitive text comparison). Matched items are mapped in place,
//! unmatched sources are appended as new items when creation is enabled, and
//! destination items without a source are never removed.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::overrides::OverrideSet;
use super::Mapper;
use crate::config::MapperConfig;
use crate::error::Result;
use crate::model::CollectionTarget;
use crate::source::{any_field, NodeRef};
use crate::types::PropertySet;

/// Options of one collection mapping call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Destination field compared with the source identity
    pub identity_field: String,
    /// Append items for sources without a matching destination item
    pub create_missing: bool,
    /// Empty the destination list first
    pub clear_before_mapping: bool,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            identity_field: "Id".to_string(),
            create_missing: true,
            clear_before_mapping: true,
        }
    }
}

impl CollectionOptions {
    pub fn from_config(config: &MapperConfig) -> Self {
        Self {
            identity_field: config.identity_field.clone(),
            create_missing: config.create_missing_items,
            clear_before_mapping: config.clear_before_mapping,
        }
    }

    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    pub fn with_create_missing(mut self, create_missing: bool) -> Self {
        self.create_missing = create_missing;
        self
    }

    pub fn with_clear_before_mapping(mut self, clear: bool) -> Self {
        self.clear_before_mapping = clear;
        self
    }
}

/// Merge `sources` into `destination` by identity
///
/// Without `clear_before_mapping` a repeated call does not double the list
/// when the item type carries the identity field: matched items are mapped in
/// place. Only sources without a matching item are appended again, which is
/// every source when the item type has no identity field.
pub(crate) fn reconcile(
    mapper: &Mapper,
    sources: &[NodeRef],
    destination: &mut dyn CollectionTarget,
    overrides: &OverrideSet,
    options: &CollectionOptions,
    property_set: PropertySet,
) -> Result<()> {
    let span = tracing::debug_span!(
        "map_collection",
        item = destination.item_type().short_name(),
        sources = sources.len()
    );
    let _guard = span.enter();

    if options.clear_before_mapping {
        destination.clear();
    }

    for source in sources {
        let identity = any_field(source.as_ref(), &options.identity_field).and_then(|value| value.as_text());
        let position = identity
            .as_deref()
            .and_then(|identity| find_item(destination, &options.identity_field, identity));

        match position {
            Some(index) => {
                if let Some(item) = destination.item_mut(index) {
                    tracing::trace!(index, "mapping onto existing item");
                    mapper.map_target(source.as_ref(), item, overrides, property_set)?;
                }
            }
            None if options.create_missing => {
                let item = destination.push_default();
                mapper.map_target(source.as_ref(), item, overrides, property_set)?;
            }
            None => {
                tracing::debug!(identity = identity.as_deref().unwrap_or(""), "no matching item, skipped");
            }
        }
    }

    Ok(())
}

fn find_item(destination: &dyn CollectionTarget, identity_field: &str, identity: &str) -> Option<usize> {
    let identity = identity.to_lowercase();
    (0..destination.len()).find(|index| {
        destination
            .item(*index)
            .and_then(|item| item.field_value(identity_field))
            .and_then(|value| value.to_text())
            .map_or(false, |value| value.to_lowercase() == identity)
    })
}
