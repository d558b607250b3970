//! JSON document source
//!
//! A [`JsonNode`] points at one object inside a shared parsed document.
//! Object members become nested nodes, arrays of objects become node lists and
//! every other array is flattened into comma separated text. The parent of a
//! node is the closest enclosing object.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::{inherited_field, match_document_key, ContentNode, NodeRef};
use crate::error::{Error, Result};
use crate::types::SourceValue;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// An object inside a JSON document
#[derive(Debug, Clone)]
pub struct JsonNode {
    root: Arc<Value>,
    path: Vec<Segment>,
    case_insensitive: bool,
}

impl JsonNode {
    /// Parse a document whose root is an object
    pub fn parse(text: &str) -> Result<NodeRef> {
        Self::parse_with(text, true)
    }

    /// Parse a document, choosing whether key lookups may ignore case
    pub fn parse_with(text: &str, case_insensitive: bool) -> Result<NodeRef> {
        Ok(Arc::new(Self::object(serde_json::from_str(text)?, case_insensitive)?))
    }

    /// Wrap an already parsed object
    pub fn from_value(value: Value) -> Result<NodeRef> {
        Ok(Arc::new(Self::object(value, true)?))
    }

    /// Parse a collection document
    ///
    /// The root is either an array of objects or an object whose first array
    /// member holds the items (`{"items": [...]}`).
    pub fn parse_collection(text: &str) -> Result<Vec<NodeRef>> {
        Self::parse_collection_with(text, true)
    }

    pub fn parse_collection_with(text: &str, case_insensitive: bool) -> Result<Vec<NodeRef>> {
        let value: Value = serde_json::from_str(text)?;
        let node = Self::root(value, case_insensitive);
        let items = match node.value() {
            Value::Array(_) => node.array_items(&[]),
            Value::Object(map) => map
                .iter()
                .find(|(_, v)| v.is_array())
                .map(|(key, _)| node.array_items(&[Segment::Key(key.clone())]))
                .unwrap_or_default(),
            other => {
                return Err(Error::Configuration {
                    message: format!("JSON collection must be an array, found {}", kind_of(other)),
                    source: None,
                })
            }
        };
        Ok(items)
    }

    fn object(value: Value, case_insensitive: bool) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Configuration {
                message: format!("JSON source must be an object, found {}", kind_of(&value)),
                source: None,
            });
        }
        Ok(Self::root(value, case_insensitive))
    }

    fn root(value: Value, case_insensitive: bool) -> Self {
        Self {
            root: Arc::new(value),
            path: Vec::new(),
            case_insensitive,
        }
    }

    fn at(&self, path: Vec<Segment>) -> Self {
        Self {
            root: Arc::clone(&self.root),
            path,
            case_insensitive: self.case_insensitive,
        }
    }

    fn value(&self) -> &Value {
        let mut current = self.root.as_ref();
        for segment in &self.path {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key).unwrap_or(&Value::Null),
                (Segment::Index(index), Value::Array(items)) => items.get(*index).unwrap_or(&Value::Null),
                _ => &Value::Null,
            };
        }
        current
    }

    /// Object nodes for every object element of the array at `relative`
    fn array_items(&self, relative: &[Segment]) -> Vec<NodeRef> {
        let mut base = self.path.clone();
        base.extend_from_slice(relative);
        let array = self.at(base.clone());
        match array.value() {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.is_object())
                .map(|(index, _)| {
                    let mut path = base.clone();
                    path.push(Segment::Index(index));
                    Arc::new(self.at(path)) as NodeRef
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn member(&self, key: &str) -> Option<SourceValue> {
        let map = self.value().as_object()?;
        let value = map.get(key)?;
        let segment = Segment::Key(key.to_string());
        Some(match value {
            Value::Null => SourceValue::Null,
            Value::Bool(b) => SourceValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => SourceValue::Int(i),
                // Beyond i64; the text form keeps every digit for unsigned fields
                (None, Some(_)) => SourceValue::Text(n.to_string()),
                (None, None) => SourceValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => SourceValue::Text(s.clone()),
            Value::Object(_) => {
                let mut path = self.path.clone();
                path.push(segment);
                SourceValue::Node(Arc::new(self.at(path)))
            }
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                SourceValue::Nodes(self.array_items(&[segment]))
            }
            Value::Array(items) => SourceValue::Text(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        })
    }
}

impl ContentNode for JsonNode {
    fn native_field(&self, name: &str) -> Option<SourceValue> {
        self.member(name)
    }

    fn custom_field(&self, name: &str, recursive: bool) -> Option<SourceValue> {
        let found = self.value().as_object().and_then(|map| {
            match_document_key(name, map.keys().map(String::as_str), self.case_insensitive)
                .and_then(|key| self.member(key))
        });
        match found {
            Some(value) if !(recursive && value.is_blank()) => Some(value),
            _ if recursive => inherited_field(self, name, self.path.len()),
            other => other,
        }
    }

    fn parent(&self) -> Option<NodeRef> {
        let mut path = self.path.clone();
        path.pop()?;
        // An array element's parent is the object holding the array
        while matches!(path.last(), Some(Segment::Index(_))) || self.at(path.clone()).value().is_array() {
            path.pop()?;
        }
        Some(Arc::new(self.at(path)))
    }

    fn children(&self) -> Vec<NodeRef> {
        match self.value() {
            Value::Array(_) => self.array_items(&[]),
            _ => Vec::new(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
