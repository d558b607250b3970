//! Function-valued configuration: formatters, custom mappings and value getters
//!
//! Functions are stored as `Arc<dyn Fn ..>` so overrides stay cheap to clone.
//! They have identity semantics only; two wrappers are never compared.
//! Declarative override files cannot hold closures, so they name functions
//! registered in a [`FunctionTable`] instead.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::Mapper;
use crate::error::{Error, ReferenceKind, Result};
use crate::source::ContentNode;
use crate::types::{FieldValue, SourceValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Custom mapping reading straight from the source node
pub type NodeMappingFn =
    dyn Fn(&Mapper, &dyn ContentNode, &str, bool) -> anyhow::Result<Option<FieldValue>> + Send + Sync;

/// Custom mapping converting an already resolved raw value
pub type ValueMappingFn =
    dyn Fn(&Mapper, &SourceValue) -> anyhow::Result<Option<FieldValue>> + Send + Sync;

/// A user supplied conversion producing a whole field value
///
/// Returning `Ok(None)` means "no opinion" and lets resolution fall through to
/// the next candidate.
#[derive(Clone)]
pub enum CustomMapping {
    /// Called with the node, the source field name and the recursive flag
    Node(Arc<NodeMappingFn>),
    /// Called with the raw value resolved for the field
    Value(Arc<ValueMappingFn>),
}

impl CustomMapping {
    pub fn node<F>(f: F) -> Self
    where
        F: Fn(&Mapper, &dyn ContentNode, &str, bool) -> anyhow::Result<Option<FieldValue>>
            + Send
            + Sync
            + 'static,
    {
        CustomMapping::Node(Arc::new(f))
    }

    pub fn value<F>(f: F) -> Self
    where
        F: Fn(&Mapper, &SourceValue) -> anyhow::Result<Option<FieldValue>> + Send + Sync + 'static,
    {
        CustomMapping::Value(Arc::new(f))
    }

    /// Run the mapping for one field
    ///
    /// Value mappings are skipped when no raw value was resolved.
    pub(crate) fn invoke(
        &self,
        mapper: &Mapper,
        node: &dyn ContentNode,
        source_name: &str,
        recursive: bool,
        raw: Option<&SourceValue>,
    ) -> anyhow::Result<Option<FieldValue>> {
        match self {
            CustomMapping::Node(f) => f(mapper, node, source_name, recursive),
            CustomMapping::Value(f) => match raw {
                Some(value) => f(mapper, value),
                None => Ok(None),
            },
        }
    }
}

impl fmt::Debug for CustomMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomMapping::Node(_) => write!(f, "CustomMapping::Node(..)"),
            CustomMapping::Value(_) => write!(f, "CustomMapping::Value(..)"),
        }
    }
}

/// String transformation applied to a text value before assignment
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Formatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, raw: &str) -> String {
        (self.0)(raw)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formatter(..)")
    }
}

/// Replacement for the convention-based custom field lookup
#[derive(Clone)]
pub struct ValueGetter(Arc<dyn Fn(&dyn ContentNode, &str, bool) -> Option<SourceValue> + Send + Sync>);

impl ValueGetter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn ContentNode, &str, bool) -> Option<SourceValue> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn get(&self, node: &dyn ContentNode, name: &str, recursive: bool) -> Option<SourceValue> {
        (self.0)(node, name, recursive)
    }
}

impl fmt::Debug for ValueGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueGetter(..)")
    }
}

/// Functions addressable by name from declarative overrides
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    formatters: HashMap<String, Formatter>,
    mappings: HashMap<String, CustomMapping>,
    getters: HashMap<String, ValueGetter>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_formatter(&mut self, name: impl Into<String>, formatter: Formatter) {
        self.formatters.insert(name.into(), formatter);
    }

    pub fn add_mapping(&mut self, name: impl Into<String>, mapping: CustomMapping) {
        self.mappings.insert(name.into(), mapping);
    }

    pub fn add_value_getter(&mut self, name: impl Into<String>, getter: ValueGetter) {
        self.getters.insert(name.into(), getter);
    }

    pub fn formatter(&self, name: &str, field: &str) -> Result<&Formatter> {
        self.formatters
            .get(name)
            .ok_or_else(|| unresolved(ReferenceKind::Formatter, name, field))
    }

    pub fn mapping(&self, name: &str, field: &str) -> Result<&CustomMapping> {
        self.mappings
            .get(name)
            .ok_or_else(|| unresolved(ReferenceKind::CustomMapping, name, field))
    }

    pub fn value_getter(&self, name: &str, field: &str) -> Result<&ValueGetter> {
        self.getters
            .get(name)
            .ok_or_else(|| unresolved(ReferenceKind::ValueGetter, name, field))
    }

    pub fn len(&self) -> usize {
        self.formatters.len() + self.mappings.len() + self.getters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unresolved(kind: ReferenceKind, name: &str, field: &str) -> Error {
    Error::UnresolvedReference {
        kind,
        name: name.to_string(),
        field: field.to_string(),
    }
}
