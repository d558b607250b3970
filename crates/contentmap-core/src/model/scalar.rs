//! [`ModelField`] implementations for scalar field types and their `Option`s

use super::{FieldType, ModelField, ScalarKind};
use crate::mapping::coercion::{parse_bool, parse_date_time};
use crate::types::{FieldValue, RichText};
use chrono::{NaiveDate, NaiveDateTime};

/// Conversion between a scalar Rust type and [`FieldValue`]
trait Scalar: Sized {
    const KIND: ScalarKind;

    fn to_value(&self) -> FieldValue;

    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! signed_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Int;

                fn to_value(&self) -> FieldValue {
                    FieldValue::Int(i64::from(*self))
                }

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Int(i) => <$ty>::try_from(i).ok(),
                        FieldValue::UInt(u) => <$ty>::try_from(u).ok(),
                        FieldValue::Float(f) if f.fract() == 0.0 => <$ty>::try_from(f as i64).ok(),
                        FieldValue::Text(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::UInt;

                fn to_value(&self) -> FieldValue {
                    FieldValue::UInt(u64::from(*self))
                }

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Int(i) => <$ty>::try_from(i).ok(),
                        FieldValue::UInt(u) => <$ty>::try_from(u).ok(),
                        FieldValue::Float(f) if f.fract() == 0.0 && f >= 0.0 => <$ty>::try_from(f as u64).ok(),
                        FieldValue::Text(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

signed_scalar!(i8, i16, i32, i64);
unsigned_scalar!(u8, u16, u32, u64);

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(f) => Some(f),
            FieldValue::Int(i) => Some(i as f64),
            FieldValue::UInt(u) => Some(u as f64),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn to_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(b),
            FieldValue::Int(i) => Some(i != 0),
            FieldValue::UInt(u) => Some(u != 0),
            FieldValue::Text(s) => parse_bool(&s),
            _ => None,
        }
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s),
            FieldValue::RichText(r) => Some(r.0),
            other => other.to_text(),
        }
    }
}

impl Scalar for RichText {
    const KIND: ScalarKind = ScalarKind::RichText;

    fn to_value(&self) -> FieldValue {
        FieldValue::RichText(self.clone())
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::RichText(r) => Some(r),
            FieldValue::Text(s) => Some(RichText(s)),
            _ => None,
        }
    }
}

impl Scalar for NaiveDateTime {
    const KIND: ScalarKind = ScalarKind::DateTime;

    fn to_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTime(d) => Some(d),
            FieldValue::Date(d) => d.and_hms_opt(0, 0, 0),
            FieldValue::Text(s) => parse_date_time(&s),
            _ => None,
        }
    }
}

impl Scalar for NaiveDate {
    const KIND: ScalarKind = ScalarKind::Date;

    fn to_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Date(d) => Some(d),
            FieldValue::DateTime(d) => Some(d.date()),
            FieldValue::Text(s) => parse_date_time(&s).map(|d| d.date()),
            _ => None,
        }
    }
}

macro_rules! scalar_fields {
    ($($ty:ty),*) => {
        $(
            impl ModelField for $ty {
                fn field_type() -> FieldType {
                    FieldType::Scalar(<$ty as Scalar>::KIND)
                }

                fn get_value(&self) -> FieldValue {
                    Scalar::to_value(self)
                }

                fn set_value(&mut self, value: FieldValue) -> bool {
                    match <$ty as Scalar>::from_value(value) {
                        Some(converted) => {
                            *self = converted;
                            true
                        }
                        None => false,
                    }
                }
            }

            impl ModelField for Option<$ty> {
                const NULLABLE: bool = true;

                fn field_type() -> FieldType {
                    FieldType::Scalar(<$ty as Scalar>::KIND)
                }

                fn get_value(&self) -> FieldValue {
                    match self {
                        Some(inner) => Scalar::to_value(inner),
                        None => FieldValue::Null,
                    }
                }

                fn set_value(&mut self, value: FieldValue) -> bool {
                    if value.is_null() {
                        *self = None;
                        return true;
                    }
                    match <$ty as Scalar>::from_value(value) {
                        Some(converted) => {
                            *self = Some(converted);
                            true
                        }
                        None => false,
                    }
                }
            }
        )*
    };
}

scalar_fields!(
    bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, RichText, NaiveDateTime,
    NaiveDate
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        let mut small: u8 = 0;
        assert!(small.set_value(FieldValue::Int(200)));
        assert_eq!(small, 200);
        assert!(!small.set_value(FieldValue::Int(300)));
        assert!(!small.set_value(FieldValue::Int(-1)));
        assert_eq!(small, 200);

        let mut whole: i32 = 0;
        assert!(whole.set_value(FieldValue::Float(4.0)));
        assert!(!whole.set_value(FieldValue::Float(4.5)));
        assert_eq!(whole, 4);
    }

    #[test]
    fn test_optional_fields() {
        let mut maybe: Option<i64> = Some(3);
        assert!(maybe.set_value(FieldValue::Null));
        assert_eq!(maybe, None);
        assert!(maybe.set_value(FieldValue::Text(" 12 ".into())));
        assert_eq!(maybe, Some(12));
        assert_eq!(<Option<i64> as ModelField>::field_type(), FieldType::Scalar(ScalarKind::Int));
        assert!(<Option<i64> as ModelField>::NULLABLE);
        assert!(!<i64 as ModelField>::NULLABLE);
    }

    #[test]
    fn test_text_conversions() {
        let mut text = String::new();
        assert!(text.set_value(FieldValue::Int(42)));
        assert_eq!(text, "42");
        assert!(!text.set_value(FieldValue::Null));

        let mut rich = RichText::default();
        assert!(rich.set_value(FieldValue::Text("<p>x</p>".into())));
        assert_eq!(rich.as_str(), "<p>x</p>");
    }

    #[test]
    fn test_bool_conversions() {
        let mut flag = false;
        assert!(flag.set_value(FieldValue::Text("1".into())));
        assert!(flag);
        assert!(flag.set_value(FieldValue::Int(0)));
        assert!(!flag);
        assert!(!flag.set_value(FieldValue::Text("maybe".into())));
    }
}
