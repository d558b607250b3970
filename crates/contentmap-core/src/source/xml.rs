//! XML fragment source
//!
//! The fragment is parsed with `roxmltree` and copied into an owned element
//! table so nodes can outlive the input text. Attributes are native fields;
//! child elements are custom fields. A leaf element reads as its text, an
//! element with child elements reads as a nested node, and repeated elements
//! of the same name read as a node list. A nested node landing on a scalar
//! field reads as its text content, the text of all descendants.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::{inherited_field, match_document_key, ContentNode, NodeRef};
use crate::error::Result;
use crate::types::SourceValue;
use std::sync::Arc;

#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    /// Trimmed text of every descendant text node
    text: String,
    children: Vec<usize>,
    parent: Option<usize>,
}

#[derive(Debug)]
struct XmlDocument {
    elements: Vec<Element>,
    case_insensitive: bool,
}

/// An element of a parsed XML fragment
#[derive(Debug, Clone)]
pub struct XmlNode {
    document: Arc<XmlDocument>,
    index: usize,
}

impl XmlNode {
    /// Parse a fragment and return its root element
    pub fn parse(text: &str) -> Result<NodeRef> {
        Self::parse_with(text, true)
    }

    /// Parse a fragment, choosing whether name lookups may ignore case
    pub fn parse_with(text: &str, case_insensitive: bool) -> Result<NodeRef> {
        Ok(Arc::new(Self::parse_document(text, case_insensitive)?))
    }

    /// Parse a fragment and return the child elements of its root
    pub fn parse_collection(text: &str) -> Result<Vec<NodeRef>> {
        Self::parse_collection_with(text, true)
    }

    pub fn parse_collection_with(text: &str, case_insensitive: bool) -> Result<Vec<NodeRef>> {
        Ok(Self::parse_document(text, case_insensitive)?.children())
    }

    fn parse_document(text: &str, case_insensitive: bool) -> Result<Self> {
        let parsed = roxmltree::Document::parse(text)?;
        let mut elements = Vec::new();
        collect(parsed.root_element(), None, &mut elements);
        Ok(Self {
            document: Arc::new(XmlDocument {
                elements,
                case_insensitive,
            }),
            index: 0,
        })
    }

    fn element(&self) -> &Element {
        &self.document.elements[self.index]
    }

    fn node(&self, index: usize) -> NodeRef {
        Arc::new(Self {
            document: Arc::clone(&self.document),
            index,
        })
    }

    /// Element name of this node
    pub fn name(&self) -> &str {
        &self.element().name
    }

    fn child_value(&self, matches: &[usize]) -> SourceValue {
        if let [single] = matches {
            let child = &self.document.elements[*single];
            if child.children.is_empty() {
                SourceValue::Text(child.text.clone())
            } else {
                SourceValue::Node(self.node(*single))
            }
        } else {
            SourceValue::Nodes(matches.iter().map(|index| self.node(*index)).collect())
        }
    }
}

fn collect(node: roxmltree::Node<'_, '_>, parent: Option<usize>, elements: &mut Vec<Element>) -> usize {
    let index = elements.len();
    let text = node
        .descendants()
        .filter(|descendant| descendant.is_text())
        .filter_map(|descendant| descendant.text())
        .collect::<String>()
        .trim()
        .to_string();

    elements.push(Element {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        text,
        children: Vec::new(),
        parent,
    });

    let children: Vec<usize> = node
        .children()
        .filter(|child| child.is_element())
        .map(|child| collect(child, Some(index), elements))
        .collect();
    elements[index].children = children;
    index
}

impl ContentNode for XmlNode {
    fn native_field(&self, name: &str) -> Option<SourceValue> {
        self.element()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| SourceValue::Text(value.clone()))
    }

    fn custom_field(&self, name: &str, recursive: bool) -> Option<SourceValue> {
        let element = self.element();
        let elements = &self.document.elements;
        let case_insensitive = self.document.case_insensitive;

        let child_names = element.children.iter().map(|index| elements[*index].name.as_str());
        let found = match match_document_key(name, child_names, case_insensitive) {
            Some(key) => {
                let matches: Vec<usize> = element
                    .children
                    .iter()
                    .copied()
                    .filter(|index| elements[*index].name == key)
                    .collect();
                Some(self.child_value(&matches))
            }
            None => {
                let attribute_names = element.attributes.iter().map(|(key, _)| key.as_str());
                match_document_key(name, attribute_names, case_insensitive)
                    .and_then(|key| self.native_field(key))
            }
        };

        match found {
            Some(value) if !(recursive && value.is_blank()) => Some(value),
            _ if recursive => inherited_field(self, name, self.document.elements.len()),
            other => other,
        }
    }

    fn parent(&self) -> Option<NodeRef> {
        self.element().parent.map(|index| self.node(index))
    }

    fn text_content(&self) -> Option<String> {
        Some(self.element().text.clone()).filter(|text| !text.is_empty())
    }

    fn children(&self) -> Vec<NodeRef> {
        self.element()
            .children
            .iter()
            .map(|index| self.node(*index))
            .collect()
    }
}
