//! Per-field override configuration
//!
//! A [`FieldOverride`] tells the engine where a destination field gets its
//! value when the naming convention is not enough. Overrides come from two
//! places: annotations in the destination's descriptor table and an explicit
//! [`OverrideSet`] passed to each mapping call. The two are merged per field
//! with [`FieldOverride::merge`].
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::functions::{CustomMapping, Formatter, ValueGetter};
use crate::config::is_yaml;
use crate::error::Result;
use crate::naming::to_pascal_case;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Join several source fields into one text value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Concatenation {
    pub properties: Vec<String>,
    /// Falls back to the mapper's default separator
    #[serde(default)]
    pub separator: Option<String>,
}

/// Only map a field when a source field holds a given value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyCondition {
    pub property: String,
    pub value: String,
}

/// Configuration for a single destination field
///
/// Every attribute is optional; an empty override means "use the convention".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOverride {
    /// Source field name replacing the convention
    pub source_property: Option<String>,
    /// Number of parent links to walk before reading
    pub levels_above: Option<u32>,
    /// Field read on the related node the source field points at
    pub source_related_property: Option<String>,
    /// Field read inside the nested structure the source field holds
    pub source_child_property: Option<String>,
    pub concatenate: Option<Concatenation>,
    /// Source fields tried in order; the first non-empty one wins
    pub coalesce: Option<Vec<String>>,
    pub map_if: Option<PropertyCondition>,
    /// Assigned when the field is still at its zero value before mapping
    pub default_value: Option<serde_json::Value>,
    pub ignore: Option<bool>,
    /// Key handed to the dictionary lookup collaborator
    pub dictionary_key: Option<String>,
    #[serde(skip)]
    pub formatter: Option<Formatter>,
    #[serde(rename = "formatter")]
    pub formatter_ref: Option<String>,
    #[serde(skip)]
    pub custom_mapping: Option<CustomMapping>,
    #[serde(rename = "custom_mapping")]
    pub custom_mapping_ref: Option<String>,
    #[serde(skip)]
    pub value_getter: Option<ValueGetter>,
    #[serde(rename = "value_getter")]
    pub value_getter_ref: Option<String>,
    /// Look the value up on ancestors when the node itself has none
    pub map_recursively: Option<bool>,
}

impl FieldOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.source_property = Some(name.into());
        self
    }

    pub fn levels_above(mut self, levels: u32) -> Self {
        self.levels_above = Some(levels);
        self
    }

    pub fn related(mut self, name: impl Into<String>) -> Self {
        self.source_related_property = Some(name.into());
        self
    }

    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.source_child_property = Some(name.into());
        self
    }

    pub fn concatenate<I, S>(mut self, properties: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concatenate = Some(Concatenation {
            properties: properties.into_iter().map(Into::into).collect(),
            separator: Some(separator.into()),
        });
        self
    }

    pub fn coalesce<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coalesce = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    pub fn map_if(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_if = Some(PropertyCondition {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignore = Some(true);
        self
    }

    pub fn dictionary_key(mut self, key: impl Into<String>) -> Self {
        self.dictionary_key = Some(key.into());
        self
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Formatter::new(f));
        self
    }

    pub fn formatter_ref(mut self, name: impl Into<String>) -> Self {
        self.formatter_ref = Some(name.into());
        self
    }

    pub fn custom_mapping(mut self, mapping: CustomMapping) -> Self {
        self.custom_mapping = Some(mapping);
        self
    }

    pub fn custom_mapping_ref(mut self, name: impl Into<String>) -> Self {
        self.custom_mapping_ref = Some(name.into());
        self
    }

    pub fn value_getter(mut self, getter: ValueGetter) -> Self {
        self.value_getter = Some(getter);
        self
    }

    pub fn value_getter_ref(mut self, name: impl Into<String>) -> Self {
        self.value_getter_ref = Some(name.into());
        self
    }

    pub fn map_recursively(mut self) -> Self {
        self.map_recursively = Some(true);
        self
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore.unwrap_or(false)
    }

    pub fn is_recursive(&self) -> bool {
        self.map_recursively.unwrap_or(false)
    }

    pub fn levels(&self) -> u32 {
        self.levels_above.unwrap_or(0)
    }

    pub fn source_name(&self) -> Option<&str> {
        non_empty(&self.source_property)
    }

    pub fn related_name(&self) -> Option<&str> {
        non_empty(&self.source_related_property)
    }

    pub fn child_name(&self) -> Option<&str> {
        non_empty(&self.source_child_property)
    }

    /// Concatenation list, when it has at least one entry
    pub fn concatenation(&self) -> Option<&Concatenation> {
        self.concatenate.as_ref().filter(|c| !c.properties.is_empty())
    }

    /// Coalescing list, when it has at least one entry
    pub fn coalesce_list(&self) -> Option<&[String]> {
        self.coalesce.as_deref().filter(|list| !list.is_empty())
    }

    /// Copy used for one entry of a concatenation or coalescing list
    pub(crate) fn for_composed_source(&self, source: &str) -> Self {
        Self {
            source_property: Some(source.to_string()),
            concatenate: None,
            coalesce: None,
            default_value: None,
            ..self.clone()
        }
    }

    /// Merge an explicit (per-call) override with the annotation override
    ///
    /// The explicit side wins for every attribute it sets. The ignore and
    /// map-recursively flags come from the annotation whenever it sets them.
    pub fn merge(explicit: Option<&FieldOverride>, annotation: Option<&FieldOverride>) -> FieldOverride {
        let (explicit, annotation) = match (explicit, annotation) {
            (None, None) => return FieldOverride::default(),
            (Some(e), None) => return e.clone(),
            (None, Some(a)) => return a.clone(),
            (Some(e), Some(a)) => (e, a),
        };

        FieldOverride {
            source_property: pick_text(&explicit.source_property, &annotation.source_property),
            levels_above: explicit
                .levels_above
                .filter(|levels| *levels > 0)
                .or(annotation.levels_above),
            source_related_property: pick_text(
                &explicit.source_related_property,
                &annotation.source_related_property,
            ),
            source_child_property: pick_text(
                &explicit.source_child_property,
                &annotation.source_child_property,
            ),
            concatenate: explicit
                .concatenation()
                .cloned()
                .or_else(|| annotation.concatenate.clone()),
            coalesce: explicit
                .coalesce_list()
                .map(<[String]>::to_vec)
                .or_else(|| annotation.coalesce.clone()),
            map_if: explicit.map_if.clone().or_else(|| annotation.map_if.clone()),
            default_value: explicit
                .default_value
                .clone()
                .or_else(|| annotation.default_value.clone()),
            ignore: annotation.ignore.or(explicit.ignore),
            dictionary_key: pick_text(&explicit.dictionary_key, &annotation.dictionary_key),
            formatter: explicit.formatter.clone().or_else(|| annotation.formatter.clone()),
            formatter_ref: pick_text(&explicit.formatter_ref, &annotation.formatter_ref),
            custom_mapping: explicit
                .custom_mapping
                .clone()
                .or_else(|| annotation.custom_mapping.clone()),
            custom_mapping_ref: pick_text(&explicit.custom_mapping_ref, &annotation.custom_mapping_ref),
            value_getter: explicit
                .value_getter
                .clone()
                .or_else(|| annotation.value_getter.clone()),
            value_getter_ref: pick_text(&explicit.value_getter_ref, &annotation.value_getter_ref),
            map_recursively: annotation.map_recursively.or(explicit.map_recursively),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn pick_text(explicit: &Option<String>, annotation: &Option<String>) -> Option<String> {
    non_empty(explicit)
        .map(str::to_string)
        .or_else(|| annotation.clone())
}

/// Explicit overrides for one mapping call, keyed by destination field
///
/// Keys are normalised to PascalCase so `parent_id` and `ParentId` address the
/// same field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, FieldOverride>")]
pub struct OverrideSet {
    fields: HashMap<String, FieldOverride>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the override of a field
    pub fn with(mut self, field: &str, field_override: FieldOverride) -> Self {
        self.insert(field, field_override);
        self
    }

    pub fn insert(&mut self, field: &str, field_override: FieldOverride) {
        self.fields.insert(to_pascal_case(field), field_override);
    }

    pub fn get(&self, field: &str) -> Option<&FieldOverride> {
        self.fields
            .get(field)
            .or_else(|| self.fields.get(&to_pascal_case(field)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldOverride)> {
        self.fields.iter().map(|(name, o)| (name.as_str(), o))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a declarative override map (YAML or JSON by extension)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }
}

impl From<HashMap<String, FieldOverride>> for OverrideSet {
    fn from(fields: HashMap<String, FieldOverride>) -> Self {
        let mut set = OverrideSet::new();
        for (field, field_override) in fields {
            set.insert(&field, field_override);
        }
        set
    }
}
