//! Multi-source composition: concatenation and coalescing
//!
//! Both run the regular field resolution once per listed source field with a
//! copy of the override whose source field is that entry. Text fields start
//! from an empty value; when no entry resolves, the field gets back the value
//! it held before (typically a default).
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::coercion::CoercionOptions;
use super::overrides::{Concatenation, FieldOverride};
use super::Mapper;
use crate::error::Result;
use crate::model::{FieldDescriptor, FieldType, MapTarget, ScalarKind};
use crate::source::ContentNode;
use crate::types::FieldValue;

/// Join the values of several source fields with a separator
pub(crate) fn concatenate(
    mapper: &Mapper,
    node: &dyn ContentNode,
    target: &mut dyn MapTarget,
    field: &FieldDescriptor,
    field_override: &FieldOverride,
    concatenation: &Concatenation,
    options: &CoercionOptions,
) -> Result<()> {
    let separator = concatenation
        .separator
        .clone()
        .unwrap_or_else(|| mapper.config().default_separator.clone());
    let options = CoercionOptions {
        concatenate: Some(separator),
        ..options.clone()
    };

    let saved = take_text(target, field);
    let mut assigned = false;
    for property in &concatenation.properties {
        let part = field_override.for_composed_source(property);
        assigned |= mapper.resolve_field(node, target, field, &part, &options)?;
    }

    if !assigned {
        restore(target, field, saved);
    }
    Ok(())
}

/// Take the first source field that yields a value
pub(crate) fn coalesce(
    mapper: &Mapper,
    node: &dyn ContentNode,
    target: &mut dyn MapTarget,
    field: &FieldDescriptor,
    field_override: &FieldOverride,
    sources: &[String],
    options: &CoercionOptions,
) -> Result<()> {
    let options = CoercionOptions {
        coalesce: true,
        ..options.clone()
    };

    let saved = take_text(target, field);
    for property in sources {
        let part = field_override.for_composed_source(property);
        if mapper.resolve_field(node, target, field, &part, &options)? {
            tracing::trace!(field = field.name, source = %property, "coalesced");
            return Ok(());
        }
    }

    restore(target, field, saved);
    Ok(())
}

/// Clear a text field so composition starts from nothing
fn take_text(target: &mut dyn MapTarget, field: &FieldDescriptor) -> Option<FieldValue> {
    let saved = target.field_value(field.name);
    if field.field_type == FieldType::Scalar(ScalarKind::Text) {
        target.set_field_value(field.name, FieldValue::Text(String::new()));
    }
    saved
}

fn restore(target: &mut dyn MapTarget, field: &FieldDescriptor, saved: Option<FieldValue>) {
    if let Some(value) = saved {
        target.set_field_value(field.name, value);
    }
}
