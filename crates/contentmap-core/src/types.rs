//! Core value types shared by the model, source and mapping layers
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use crate::source::NodeRef;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a destination (or field) type
///
/// Used as the key of the descriptor cache and of the custom mapping registry.
/// Equality and hashing only consider the `TypeId`; the name is kept for logs.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key of the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// String wrapper for markup content that must be kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub String);

impl RichText {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed value flowing into a destination field
///
/// Produced by custom mappings and default values and consumed by
/// [`crate::model::ModelField::set_value`]. `Object` carries nested model
/// instances (for example a [`crate::model::FileReference`]).
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    RichText(RichText),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Object(Box<dyn Any + Send>),
}

impl FieldValue {
    /// Wrap a nested model instance
    pub fn object<T: Any + Send>(value: T) -> Self {
        FieldValue::Object(Box::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Whether the value is the zero value of its type
    ///
    /// Strings count as zero when empty, dates when equal to the sentinel
    /// date. Objects are never zero.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Int(i) => *i == 0,
            FieldValue::UInt(u) => *u == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::RichText(r) => r.is_empty(),
            FieldValue::DateTime(d) => *d == sentinel_date(),
            FieldValue::Date(d) => *d == sentinel_date().date(),
            FieldValue::Object(_) => false,
        }
    }

    /// Textual form used for identity comparison and coercion
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Null | FieldValue::Object(_) => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::UInt(u) => Some(u.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::RichText(r) => Some(r.0.clone()),
            FieldValue::DateTime(d) => Some(format_date_time(d)),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Convert a JSON scalar (as found in declarative override files)
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::UInt(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "Null"),
            FieldValue::Bool(b) => write!(f, "Bool({b})"),
            FieldValue::Int(i) => write!(f, "Int({i})"),
            FieldValue::UInt(u) => write!(f, "UInt({u})"),
            FieldValue::Float(x) => write!(f, "Float({x})"),
            FieldValue::Text(s) => write!(f, "Text({s:?})"),
            FieldValue::RichText(r) => write!(f, "RichText({:?})", r.0),
            FieldValue::DateTime(d) => write!(f, "DateTime({d})"),
            FieldValue::Date(d) => write!(f, "Date({d})"),
            FieldValue::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// A raw value read from a source
#[derive(Clone)]
pub enum SourceValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// A single nested or related node
    Node(NodeRef),
    /// A list of nested or related nodes
    Nodes(Vec<NodeRef>),
}

impl SourceValue {
    pub fn text(value: impl Into<String>) -> Self {
        SourceValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Null)
    }

    /// Stringified form handed to value coercion
    ///
    /// Nodes have no textual form; `Null` has none either.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SourceValue::Null | SourceValue::Node(_) | SourceValue::Nodes(_) => None,
            SourceValue::Bool(b) => Some(b.to_string()),
            SourceValue::Int(i) => Some(i.to_string()),
            SourceValue::Float(f) => Some(f.to_string()),
            SourceValue::Text(s) => Some(s.clone()),
            SourceValue::DateTime(d) => Some(format_date_time(d)),
        }
    }

    /// Whether the value carries nothing usable (null or blank text)
    pub fn is_blank(&self) -> bool {
        match self {
            SourceValue::Null => true,
            SourceValue::Text(s) => s.trim().is_empty(),
            SourceValue::Nodes(nodes) => nodes.is_empty(),
            _ => false,
        }
    }

    /// Node form of the value, taking the first node of a list
    pub fn first_node(&self) -> Option<NodeRef> {
        match self {
            SourceValue::Node(node) => Some(node.clone()),
            SourceValue::Nodes(nodes) => nodes.first().cloned(),
            _ => None,
        }
    }
}

impl fmt::Debug for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceValue::Null => write!(f, "Null"),
            SourceValue::Bool(b) => write!(f, "Bool({b})"),
            SourceValue::Int(i) => write!(f, "Int({i})"),
            SourceValue::Float(x) => write!(f, "Float({x})"),
            SourceValue::Text(s) => write!(f, "Text({s:?})"),
            SourceValue::DateTime(d) => write!(f, "DateTime({d})"),
            SourceValue::Node(_) => write!(f, "Node(..)"),
            SourceValue::Nodes(nodes) => write!(f, "Nodes(len = {})", nodes.len()),
        }
    }
}

impl From<&str> for SourceValue {
    fn from(value: &str) -> Self {
        SourceValue::Text(value.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(value: String) -> Self {
        SourceValue::Text(value)
    }
}

impl From<i64> for SourceValue {
    fn from(value: i64) -> Self {
        SourceValue::Int(value)
    }
}

impl From<i32> for SourceValue {
    fn from(value: i32) -> Self {
        SourceValue::Int(value.into())
    }
}

impl From<f64> for SourceValue {
    fn from(value: f64) -> Self {
        SourceValue::Float(value)
    }
}

impl From<bool> for SourceValue {
    fn from(value: bool) -> Self {
        SourceValue::Bool(value)
    }
}

impl From<NaiveDateTime> for SourceValue {
    fn from(value: NaiveDateTime) -> Self {
        SourceValue::DateTime(value)
    }
}

impl From<NodeRef> for SourceValue {
    fn from(value: NodeRef) -> Self {
        SourceValue::Node(value)
    }
}

/// Which source fields a mapping call may read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySet {
    /// Only native fields (id, name, dates of a content node)
    Native,
    /// Only custom (document) fields
    Custom,
    /// Both
    #[default]
    All,
}

impl PropertySet {
    /// Whether a value of the given origin may be assigned
    pub fn allows(&self, origin: ValueOrigin) -> bool {
        match (self, origin) {
            (PropertySet::All, _) => true,
            (PropertySet::Native, ValueOrigin::Native) => true,
            (PropertySet::Custom, ValueOrigin::Custom) => true,
            _ => false,
        }
    }
}

/// Where a coerced value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Native,
    Custom,
}

/// The "no date set" sentinel, `0001-01-01T00:00:00`
pub fn sentinel_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub(crate) fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
