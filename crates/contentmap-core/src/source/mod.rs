//! Source contracts and adapters
//!
//! The engine reads every kind of source through [`ContentNode`]. A content
//! node distinguishes native fields (intrinsic attributes such as `Id` or
//! `Name`) from custom fields (document properties such as `bodyText`), can
//! walk to its parent and can resolve other nodes by identifier. Documents
//! (JSON, XML) and key/value tables implement the same contract with the parts
//! that make sense for them.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

pub mod json;
pub mod table;
pub mod tree;
pub mod xml;

pub use json::JsonNode;
pub use table::TableNode;
pub use tree::{ContentItem, ContentTree};
pub use xml::XmlNode;

use crate::naming::to_lower_camel_case;
use crate::types::SourceValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to a source node
pub type NodeRef = Arc<dyn ContentNode>;

/// A node of source data the engine maps from
pub trait ContentNode: Send + Sync {
    /// Intrinsic field, matched exactly
    fn native_field(&self, name: &str) -> Option<SourceValue>;

    /// Document property; `recursive` continues the lookup on ancestors
    fn custom_field(&self, name: &str, recursive: bool) -> Option<SourceValue>;

    fn parent(&self) -> Option<NodeRef> {
        None
    }

    /// Resolve another node of the same source by its identifier
    fn resolve_by_id(&self, _id: &str) -> Option<NodeRef> {
        None
    }

    /// Child nodes, used when a node is mapped onto a collection
    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    /// Text content of a structured node, read when it lands on a scalar field
    fn text_content(&self) -> Option<String> {
        None
    }
}

/// Walk `levels` parent links; `None` when an ancestor is missing
pub fn ancestor(node: &dyn ContentNode, levels: u32) -> Option<NodeRef> {
    let mut current = node.parent()?;
    for _ in 1..levels {
        current = current.parent()?;
    }
    Some(current)
}

/// Read a field natively first, then as a custom field
pub fn any_field(node: &dyn ContentNode, name: &str) -> Option<SourceValue> {
    node.native_field(name)
        .or_else(|| node.custom_field(name, false))
}

/// The node a field value points at: the node itself or the node its id names
pub fn referenced_node(node: &dyn ContentNode, value: &SourceValue) -> Option<NodeRef> {
    value.first_node().or_else(|| {
        value
            .as_text()
            .filter(|id| !id.trim().is_empty())
            .and_then(|id| node.resolve_by_id(&id))
    })
}

/// Custom field of the closest ancestor holding a non-blank value
///
/// At most `max_steps` parent links are followed, so hand-built sources with
/// parent cycles terminate.
pub(crate) fn inherited_field(node: &dyn ContentNode, name: &str, max_steps: usize) -> Option<SourceValue> {
    let mut current = node.parent();
    for _ in 0..max_steps {
        let parent = current?;
        match parent.custom_field(name, false) {
            Some(value) if !value.is_blank() => return Some(value),
            _ => current = parent.parent(),
        }
    }
    None
}

/// Localised text by dictionary key
pub trait DictionaryLookup: Send + Sync {
    fn get_by_key(&self, key: &str) -> Option<String>;
}

impl DictionaryLookup for HashMap<String, String> {
    fn get_by_key(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Find a document key for a field name
///
/// Candidates are tried in order: the exact name, its lower-invariant form,
/// its lower-camel-case form and, when `case_insensitive` is set, any key
/// equal ignoring ASCII case.
pub(crate) fn match_document_key<'k, I>(name: &str, keys: I, case_insensitive: bool) -> Option<&'k str>
where
    I: IntoIterator<Item = &'k str> + Clone,
{
    let candidates = [name.to_string(), name.to_lowercase(), to_lower_camel_case(name)];
    for candidate in &candidates {
        if let Some(key) = keys.clone().into_iter().find(|key| key == candidate) {
            return Some(key);
        }
    }
    if case_insensitive {
        return keys.into_iter().find(|key| key.eq_ignore_ascii_case(name));
    }
    None
}
