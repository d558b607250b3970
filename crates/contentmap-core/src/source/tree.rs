//! In-memory hierarchical content source
//!
//! A [`ContentTree`] holds published content items linked by parent id. Items
//! expose `Id`, `Name`, `Level`, `ParentId` and `Children` plus any extra native
//! values as native fields, and their document properties as custom fields.
//! Property lookups can continue up the ancestor chain, and property values
//! holding an item id can be resolved to the referenced item.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::{inherited_field, ContentNode, NodeRef};
use crate::types::SourceValue;
use std::collections::HashMap;
use std::sync::Arc;

/// One content item before it is placed in a tree
#[derive(Debug, Clone)]
pub struct ContentItem {
    id: i64,
    name: String,
    parent_id: Option<i64>,
    native: HashMap<String, SourceValue>,
    properties: HashMap<String, SourceValue>,
}

impl ContentItem {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            native: HashMap::new(),
            properties: HashMap::new(),
        }
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Add an intrinsic field such as `CreateDate` or `Url`
    pub fn native(mut self, name: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.native.insert(name.into(), value.into());
        self
    }

    /// Add a document property by alias
    pub fn property(mut self, alias: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.properties.insert(alias.into(), value.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug)]
struct TreeData {
    items: Vec<ContentItem>,
    by_id: HashMap<i64, usize>,
    children: Vec<Vec<usize>>,
}

/// A set of content items addressable by id
#[derive(Debug, Clone)]
pub struct ContentTree {
    data: Arc<TreeData>,
}

impl ContentTree {
    /// Build a tree; items whose parent id is unknown become roots
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        let by_id: HashMap<i64, usize> = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id, index))
            .collect();

        let mut children = vec![Vec::new(); items.len()];
        for (index, item) in items.iter().enumerate() {
            if let Some(parent) = item.parent_id.and_then(|id| by_id.get(&id)) {
                children[*parent].push(index);
            }
        }

        Self {
            data: Arc::new(TreeData {
                items,
                by_id,
                children,
            }),
        }
    }

    pub fn node(&self, id: i64) -> Option<NodeRef> {
        self.data.by_id.get(&id).map(|index| self.node_at(*index))
    }

    /// Items without a parent in the tree
    pub fn roots(&self) -> Vec<NodeRef> {
        self.data
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.parent_id.map_or(true, |id| !self.data.by_id.contains_key(&id)))
            .map(|(index, _)| self.node_at(index))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.items.is_empty()
    }

    fn node_at(&self, index: usize) -> NodeRef {
        Arc::new(TreeNode {
            data: Arc::clone(&self.data),
            index,
        })
    }
}

struct TreeNode {
    data: Arc<TreeData>,
    index: usize,
}

impl TreeNode {
    fn item(&self) -> &ContentItem {
        &self.data.items[self.index]
    }

    fn node_at(&self, index: usize) -> NodeRef {
        Arc::new(TreeNode {
            data: Arc::clone(&self.data),
            index,
        })
    }

    fn parent_index(&self) -> Option<usize> {
        self.item()
            .parent_id
            .and_then(|id| self.data.by_id.get(&id))
            .copied()
    }

    fn level(&self) -> i64 {
        let mut level = 1;
        let mut current = self.parent_index();
        while let Some(index) = current {
            level += 1;
            current = self.data.items[index]
                .parent_id
                .and_then(|id| self.data.by_id.get(&id))
                .copied();
            // Guard against parent cycles in hand-built trees
            if level as usize > self.data.items.len() {
                break;
            }
        }
        level
    }

    fn property(&self, alias: &str) -> Option<SourceValue> {
        let properties = &self.item().properties;
        properties.get(alias).cloned().or_else(|| {
            properties
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, value)| value.clone())
        })
    }
}

impl ContentNode for TreeNode {
    fn native_field(&self, name: &str) -> Option<SourceValue> {
        let item = self.item();
        match name {
            "Id" => Some(SourceValue::Int(item.id)),
            "Name" => Some(SourceValue::Text(item.name.clone())),
            "Level" => Some(SourceValue::Int(self.level())),
            "ParentId" => Some(SourceValue::Int(item.parent_id.unwrap_or_default())),
            "Children" => Some(SourceValue::Nodes(self.children())),
            _ => item.native.get(name).cloned(),
        }
    }

    fn custom_field(&self, name: &str, recursive: bool) -> Option<SourceValue> {
        match self.property(name) {
            Some(value) if !(recursive && value.is_blank()) => Some(value),
            _ if recursive => inherited_field(self, name, self.data.items.len()),
            other => other,
        }
    }

    fn parent(&self) -> Option<NodeRef> {
        self.parent_index().map(|index| self.node_at(index))
    }

    fn resolve_by_id(&self, id: &str) -> Option<NodeRef> {
        // Multi-pickers store comma separated ids; the first one is used
        let first = id.split(',').next()?.trim();
        let id: i64 = first.parse().ok()?;
        self.data.by_id.get(&id).map(|index| self.node_at(*index))
    }

    fn children(&self) -> Vec<NodeRef> {
        self.data.children[self.index]
            .iter()
            .map(|index| self.node_at(*index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ContentTree {
        ContentTree::from_items(vec![
            ContentItem::new(1001, "Home").property("siteTitle", "My site"),
            ContentItem::new(1000, "Test content")
                .parent(1001)
                .property("bodyText", "This is the body text")
                .property("siteTitle", "")
                .property("picker", "1002"),
            ContentItem::new(1002, "Linked").parent(1001),
        ])
    }

    fn text(value: Option<SourceValue>) -> Option<String> {
        value.and_then(|v| v.as_text())
    }

    #[test]
    fn test_native_fields() {
        let tree = tree();
        let node = tree.node(1000).unwrap();
        assert_eq!(text(node.native_field("Id")).as_deref(), Some("1000"));
        assert_eq!(text(node.native_field("Level")).as_deref(), Some("2"));
        assert_eq!(text(node.native_field("ParentId")).as_deref(), Some("1001"));
        assert!(node.native_field("bodyText").is_none());

        let home = tree.node(1001).unwrap();
        match home.native_field("Children") {
            Some(SourceValue::Nodes(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected children, got {:?}", other),
        }
    }

    #[test]
    fn test_recursive_property() {
        let tree = tree();
        let node = tree.node(1000).unwrap();
        assert_eq!(text(node.custom_field("siteTitle", false)).as_deref(), Some(""));
        assert_eq!(text(node.custom_field("siteTitle", true)).as_deref(), Some("My site"));
        assert_eq!(text(node.custom_field("BodyText", false)).as_deref(), Some("This is the body text"));
    }

    #[test]
    fn test_resolve_by_id() {
        let tree = tree();
        let node = tree.node(1000).unwrap();
        let linked = node.resolve_by_id("1002,1001").unwrap();
        assert_eq!(text(linked.native_field("Name")).as_deref(), Some("Linked"));
        assert!(node.resolve_by_id("abc").is_none());
        assert!(node.resolve_by_id("9999").is_none());
    }

    #[test]
    fn test_roots() {
        let tree = tree();
        assert_eq!(tree.len(), 3);
        let roots = tree.roots();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].parent().is_none());
    }
}
