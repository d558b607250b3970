//! Built-in custom mappings seeded by [`MapperBuilder::build`](super::MapperBuilder::build)
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::functions::CustomMapping;
use super::overrides::OverrideSet;
use crate::model::FileReference;
use crate::source::referenced_node;
use crate::types::FieldValue;

/// Map a file picker field onto a [`FileReference`]
///
/// The source field holds the file node itself, a list of file nodes (the
/// first one is used) or the id of the file node. Unresolvable references
/// produce no value, so the field keeps whatever it held.
pub fn file_reference() -> CustomMapping {
    CustomMapping::node(|mapper, node, source_name, recursive| {
        let Some(file) = node
            .custom_field(source_name, recursive)
            .and_then(|value| referenced_node(node, &value))
        else {
            return Ok(None);
        };

        let mut reference = FileReference::default();
        mapper.map(file.as_ref(), &mut reference, &OverrideSet::new())?;
        Ok(Some(FieldValue::object(reference)))
    })
}
