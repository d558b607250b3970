//! Key/value table source
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::{ContentNode, NodeRef};
use crate::types::SourceValue;
use std::collections::HashMap;
use std::sync::Arc;

/// A flat string-keyed row
///
/// Keys match exactly; there is no case folding. Every key is both a native and
/// a custom field, and a table has no parent.
#[derive(Debug, Clone, Default)]
pub struct TableNode {
    values: HashMap<String, SourceValue>,
}

impl TableNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SourceValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for TableNode {
    fn from(values: HashMap<String, String>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (key, SourceValue::Text(value)))
                .collect(),
        }
    }
}

impl From<HashMap<String, SourceValue>> for TableNode {
    fn from(values: HashMap<String, SourceValue>) -> Self {
        Self { values }
    }
}

impl ContentNode for TableNode {
    fn native_field(&self, name: &str) -> Option<SourceValue> {
        self.values.get(name).cloned()
    }

    fn custom_field(&self, name: &str, _recursive: bool) -> Option<SourceValue> {
        self.values.get(name).cloned()
    }
}
