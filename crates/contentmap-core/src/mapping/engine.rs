//! Property resolution
//!
//! For every settable destination field the engine merges the explicit and
//! annotation overrides, then walks a fixed sequence of steps until one of
//! them assigns the field or decides to leave it alone:
//!
//! 1. ignore flag
//! 2. default value, when the field still holds its zero value
//! 3. dictionary key
//! 4. source node (ancestor walk, whole-object hoisting)
//! 5. map-if condition
//! 6. native field by name
//! 7. custom field by convention (or value getter, child drill-down)
//! 8. custom mappings
//! 9. related-node indirection
//! 10. nested object/collection mapping, else scalar coercion
//!
//! Concatenation and coalescing run steps 4 to 10 once per listed source
//! field (see [`super::composition`]).
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::coercion::{set_coerced_value, CoercionOptions};
use super::collection::reconcile;
use super::composition;
use super::functions::CustomMapping;
use super::overrides::{FieldOverride, OverrideSet, PropertyCondition};
use super::Mapper;
use crate::error::{Error, Result};
use crate::model::{FieldDescriptor, FieldType, MapTarget, NestedTarget};
use crate::naming::to_lower_camel_case;
use crate::source::{ancestor, any_field, referenced_node, ContentNode, NodeRef};
use crate::types::{FieldValue, PropertySet, SourceValue, ValueOrigin};

impl Mapper {
    /// Map every settable field of `target` from `node`
    pub(crate) fn map_target(
        &self,
        node: &dyn ContentNode,
        target: &mut dyn MapTarget,
        overrides: &OverrideSet,
        property_set: PropertySet,
    ) -> Result<()> {
        let fields = self.cache().settable_fields(target);
        let span = tracing::debug_span!("map", destination = target.type_key().short_name());
        let _guard = span.enter();

        for field in fields.iter() {
            let field_override = FieldOverride::merge(overrides.get(field.name), field.annotation.as_ref());
            self.map_field(node, target, field, &field_override, property_set)?;
        }
        Ok(())
    }

    fn map_field(
        &self,
        node: &dyn ContentNode,
        target: &mut dyn MapTarget,
        field: &FieldDescriptor,
        field_override: &FieldOverride,
        property_set: PropertySet,
    ) -> Result<()> {
        if field_override.is_ignored() {
            tracing::trace!(field = field.name, "ignored");
            return Ok(());
        }

        if let Some(default) = &field_override.default_value {
            let is_zero = target.field_value(field.name).map_or(false, |value| value.is_zero());
            if is_zero {
                target.set_field_value(field.name, FieldValue::from_json(default));
            }
        }

        let options = CoercionOptions {
            formatter: self.formatter_for(field, field_override)?,
            property_set,
            ..CoercionOptions::default()
        };

        if let Some(key) = field_override.dictionary_key.as_deref().filter(|key| !key.is_empty()) {
            match &self.dictionary {
                Some(dictionary) => {
                    if let Some(text) = dictionary.get_by_key(key) {
                        set_coerced_value(target, field, &text, &options);
                    }
                }
                None => log::warn!(
                    "Field {} has dictionary key '{}' but the mapper has no dictionary",
                    field.name,
                    key
                ),
            }
            return Ok(());
        }

        if let Some(concatenation) = field_override.concatenation() {
            return composition::concatenate(self, node, target, field, field_override, concatenation, &options);
        }
        if let Some(sources) = field_override.coalesce_list() {
            return composition::coalesce(self, node, target, field, field_override, sources, &options);
        }

        self.resolve_field(node, target, field, field_override, &options)?;
        Ok(())
    }

    /// Resolve one field from its source; returns whether it was assigned
    pub(crate) fn resolve_field(
        &self,
        node: &dyn ContentNode,
        target: &mut dyn MapTarget,
        field: &FieldDescriptor,
        field_override: &FieldOverride,
        options: &CoercionOptions,
    ) -> Result<bool> {
        let levels = field_override.levels();
        let ancestor_node: Option<NodeRef>;
        let source: &dyn ContentNode = if levels > 0 {
            ancestor_node = ancestor(node, levels);
            match &ancestor_node {
                Some(found) => found.as_ref(),
                None => {
                    tracing::debug!(field = field.name, levels, "ancestor not found");
                    return Ok(false);
                }
            }
        } else {
            node
        };

        if levels > 0 && field.field_type == FieldType::Object {
            return self.map_nested_object(source, target, field, options.property_set);
        }

        if let Some(condition) = &field_override.map_if {
            if field_override.related_name().is_none() && !condition_matches(node, condition) {
                tracing::debug!(field = field.name, property = %condition.property, "condition not met");
                return Ok(false);
            }
        }

        let source_name = field_override.source_name().unwrap_or(field.name);
        if field_override.related_name().is_none() && field_override.child_name().is_none() {
            if let Some(value) = source.native_field(source_name) {
                return self.assign(target, field, value, &options.with_origin(ValueOrigin::Native));
            }
        }

        if !options.property_set.allows(ValueOrigin::Custom) {
            return Ok(false);
        }
        let options = options.with_origin(ValueOrigin::Custom);

        let custom_name = field_override
            .source_name()
            .map(str::to_string)
            .unwrap_or_else(|| to_lower_camel_case(field.name));
        let recursive = field_override.is_recursive();
        let mut raw = self.custom_value(source, field, field_override, &custom_name, recursive)?;

        if let Some(child) = field_override.child_name() {
            raw = raw
                .and_then(|value| value.first_node())
                .and_then(|nested| nested.custom_field(child, false).or_else(|| nested.native_field(child)));
        }

        for mapping in self.custom_mappings(field, field_override)? {
            let produced = mapping
                .invoke(self, source, &custom_name, recursive, raw.as_ref())
                .map_err(|source| Error::CustomMapping {
                    field: field.name.to_string(),
                    message: source.to_string(),
                    source,
                })?;
            if let Some(value) = produced.filter(|value| !value.is_null()) {
                tracing::trace!(field = field.name, "assigned by custom mapping");
                return Ok(target.set_field_value(field.name, value));
            }
        }

        let Some(value) = raw else {
            return Ok(false);
        };

        if let Some(related) = field_override.related_name() {
            let Some(related_node) = referenced_node(source, &value) else {
                tracing::debug!(field = field.name, "related node not found");
                return Ok(false);
            };
            if let Some(condition) = &field_override.map_if {
                if !condition_matches(related_node.as_ref(), condition) {
                    return Ok(false);
                }
            }
            return match any_field(related_node.as_ref(), related) {
                Some(related_value) => self.assign(target, field, related_value, &options),
                None => Ok(false),
            };
        }

        self.assign(target, field, value, &options)
    }

    /// Value getter, else the convention-based custom field lookup
    fn custom_value(
        &self,
        source: &dyn ContentNode,
        field: &FieldDescriptor,
        field_override: &FieldOverride,
        name: &str,
        recursive: bool,
    ) -> Result<Option<SourceValue>> {
        if let Some(getter) = &field_override.value_getter {
            return Ok(getter.get(source, name, recursive));
        }
        if let Some(reference) = field_override.value_getter_ref.as_deref() {
            let getter = self.functions.value_getter(reference, field.name)?;
            return Ok(getter.get(source, name, recursive));
        }
        Ok(source.custom_field(name, recursive))
    }

    /// Candidate custom mappings in priority order
    fn custom_mappings(&self, field: &FieldDescriptor, field_override: &FieldOverride) -> Result<Vec<CustomMapping>> {
        let mut candidates = Vec::new();
        if let Some(mapping) = &field_override.custom_mapping {
            candidates.push(mapping.clone());
        }
        if let Some(reference) = field_override.custom_mapping_ref.as_deref().filter(|r| !r.is_empty()) {
            candidates.push(self.functions.mapping(reference, field.name)?.clone());
        }
        candidates.extend(self.registry.candidates(field.type_key, field.name));
        Ok(candidates)
    }

    fn formatter_for(
        &self,
        field: &FieldDescriptor,
        field_override: &FieldOverride,
    ) -> Result<Option<super::Formatter>> {
        if let Some(formatter) = &field_override.formatter {
            return Ok(Some(formatter.clone()));
        }
        match field_override.formatter_ref.as_deref().filter(|r| !r.is_empty()) {
            Some(reference) => Ok(Some(self.functions.formatter(reference, field.name)?.clone())),
            None => Ok(None),
        }
    }

    /// Write a resolved value: nested mapping for nodes, coercion otherwise
    fn assign(
        &self,
        target: &mut dyn MapTarget,
        field: &FieldDescriptor,
        value: SourceValue,
        options: &CoercionOptions,
    ) -> Result<bool> {
        if !options.property_set.allows(options.origin) {
            return Ok(false);
        }

        match (field.field_type, value) {
            (FieldType::Object, value) => match value.first_node() {
                Some(nested) => self.map_nested_object(nested.as_ref(), target, field, options.property_set),
                None => Ok(false),
            },
            (FieldType::Collection, SourceValue::Nodes(nodes)) => {
                self.map_nested_collection(&nodes, target, field, options.property_set)
            }
            (FieldType::Collection, SourceValue::Node(parent)) => {
                self.map_nested_collection(&parent.children(), target, field, options.property_set)
            }
            (FieldType::Collection, _) => Ok(false),
            (FieldType::Scalar(_), value) => match scalar_text(&value) {
                Some(text) => Ok(set_coerced_value(target, field, &text, options)),
                None => Ok(false),
            },
        }
    }

    /// Map a node onto the existing nested object of `field`
    fn map_nested_object(
        &self,
        node: &dyn ContentNode,
        target: &mut dyn MapTarget,
        field: &FieldDescriptor,
        property_set: PropertySet,
    ) -> Result<bool> {
        match target.nested_target(field.name) {
            Some(NestedTarget::Object(nested)) => {
                self.map_target(node, nested, &OverrideSet::new(), property_set)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Reconcile nodes into the existing nested collection of `field`
    fn map_nested_collection(
        &self,
        nodes: &[NodeRef],
        target: &mut dyn MapTarget,
        field: &FieldDescriptor,
        property_set: PropertySet,
    ) -> Result<bool> {
        match target.nested_target(field.name) {
            Some(NestedTarget::Collection(items)) => {
                let options = self.collection_options();
                reconcile(self, nodes, items, &OverrideSet::new(), &options, property_set)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Text handed to coercion; a single structured node reads as its text content
fn scalar_text(value: &SourceValue) -> Option<String> {
    match value {
        SourceValue::Node(node) => node.text_content(),
        other => other.as_text(),
    }
}

/// Evaluate a map-if condition; a missing property never matches
fn condition_matches(node: &dyn ContentNode, condition: &PropertyCondition) -> bool {
    match any_field(node, &condition.property).and_then(|value| value.as_text()) {
        Some(text) => text.eq_ignore_ascii_case(&condition.value),
        None => {
            log::warn!(
                "Condition property '{}' not found on source node, field skipped",
                condition.property
            );
            false
        }
    }
}

#[cfg(test)]
mod tests;
