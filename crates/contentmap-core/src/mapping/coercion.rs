//! Value coercion
//!
//! Converts raw source text into the declared scalar type of a destination
//! field. Coercion is best-effort: text that does not parse for the field's
//! type leaves the field untouched, and nested fields are never coerced.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use super::functions::Formatter;
use crate::model::{FieldDescriptor, FieldType, MapTarget, ScalarKind};
use crate::types::{sentinel_date, FieldValue, PropertySet, RichText, ValueOrigin};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Flags controlling how a raw value is written
#[derive(Debug, Clone)]
pub struct CoercionOptions {
    /// Append to the existing text with this separator
    pub concatenate: Option<String>,
    /// Only write text when the existing value is blank
    pub coalesce: bool,
    pub formatter: Option<Formatter>,
    pub property_set: PropertySet,
    /// Origin of the value being written, checked against `property_set`
    pub origin: ValueOrigin,
}

impl Default for CoercionOptions {
    fn default() -> Self {
        Self {
            concatenate: None,
            coalesce: false,
            formatter: None,
            property_set: PropertySet::All,
            origin: ValueOrigin::Custom,
        }
    }
}

impl CoercionOptions {
    pub fn with_origin(&self, origin: ValueOrigin) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }
}

/// Parse a boolean, accepting `1`/`0` as well as `true`/`false`
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    match raw {
        "1" => Some(true),
        "0" => Some(false),
        _ if raw.eq_ignore_ascii_case("true") => Some(true),
        _ if raw.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a date/time in one of the accepted layouts
///
/// RFC 3339 values are converted to UTC. A bare date reads as midnight.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Write `raw` into `field`, converted to the field's scalar type
///
/// Returns whether the field was assigned.
pub fn set_coerced_value(
    target: &mut dyn MapTarget,
    field: &FieldDescriptor,
    raw: &str,
    options: &CoercionOptions,
) -> bool {
    if !options.property_set.allows(options.origin) {
        return false;
    }

    let kind = match field.field_type {
        FieldType::Scalar(kind) => kind,
        FieldType::Object | FieldType::Collection => return false,
    };

    let value = match kind {
        ScalarKind::Bool => parse_bool(raw).map(FieldValue::Bool),
        ScalarKind::Int => raw.trim().parse().ok().map(FieldValue::Int),
        ScalarKind::UInt => raw.trim().parse().ok().map(FieldValue::UInt),
        ScalarKind::Float => raw.trim().parse().ok().map(FieldValue::Float),
        ScalarKind::DateTime | ScalarKind::Date => match parse_date_time(raw) {
            // "No date set" in the source
            Some(parsed) if field.nullable && parsed == sentinel_date() => None,
            Some(parsed) if kind == ScalarKind::Date => Some(FieldValue::Date(parsed.date())),
            parsed => parsed.map(FieldValue::DateTime),
        },
        ScalarKind::RichText => Some(FieldValue::RichText(RichText::new(raw))),
        ScalarKind::Text => text_value(target, field, raw, options),
    };

    match value {
        Some(value) => target.set_field_value(field.name, value),
        None => false,
    }
}

fn text_value(
    target: &dyn MapTarget,
    field: &FieldDescriptor,
    raw: &str,
    options: &CoercionOptions,
) -> Option<FieldValue> {
    let existing = || {
        target
            .field_value(field.name)
            .and_then(|value| value.to_text())
            .unwrap_or_default()
    };

    if let Some(separator) = &options.concatenate {
        if raw.is_empty() {
            return None;
        }
        let existing = existing();
        if existing.is_empty() {
            return Some(FieldValue::Text(raw.to_string()));
        }
        return Some(FieldValue::Text(format!("{existing}{separator}{raw}")));
    }

    if options.coalesce {
        if raw.trim().is_empty() || !existing().trim().is_empty() {
            return None;
        }
        return Some(FieldValue::Text(raw.to_string()));
    }

    if let Some(formatter) = &options.formatter {
        return Some(FieldValue::Text(formatter.apply(raw)));
    }

    (!raw.is_empty()).then(|| FieldValue::Text(raw.to_string()))
}
