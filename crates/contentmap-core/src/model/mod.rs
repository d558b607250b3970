//! Destination models
//!
//! A destination model exposes a declarative descriptor table instead of being
//! inspected at runtime. Each entry names a field, its declared type (a scalar
//! kind, a nested object or a nested collection) and the annotation override
//! attached to it. The engine reads and writes fields through [`MapTarget`],
//! and descends into nested objects and collections through [`NestedTarget`].
//!
//! Models are usually described with the [`mappable!`](crate::mappable) macro:
//!
//! ```
//! use contentmap_core::{mappable, FieldOverride};
//!
//! #[derive(Debug, Default)]
//! struct Article {
//!     id: i64,
//!     name: String,
//!     parent_id: i64,
//!     internal_note: String,
//! }
//!
//! mappable! {
//!     Article {
//!         Id => id,
//!         Name => name,
//!         ParentId => parent_id [FieldOverride::new().source("Id").levels_above(1)],
//!         InternalNote => internal_note [FieldOverride::new().ignore()],
//!     }
//! }
//! ```
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

mod file;
mod scalar;

pub use file::FileReference;

use crate::mapping::FieldOverride;
use crate::types::{FieldValue, TypeKey};

/// Scalar kinds the value coercion understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Text,
    RichText,
    DateTime,
    Date,
}

/// Declared type of a destination field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// A nested model mapped recursively
    Object,
    /// A list of nested models reconciled item by item
    Collection,
}

/// One entry of a model's descriptor table
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// PascalCase field name used for overrides and native lookups
    pub name: &'static str,
    pub field_type: FieldType,
    /// Declared type, used for custom mapping registry lookups
    pub type_key: TypeKey,
    pub nullable: bool,
    pub settable: bool,
    pub annotation: Option<FieldOverride>,
}

impl FieldDescriptor {
    /// Describe a field from a reference to it
    pub fn of<F: ModelField + 'static>(name: &'static str, _field: &F) -> Self {
        Self {
            name,
            field_type: F::field_type(),
            type_key: TypeKey::of::<F>(),
            nullable: F::NULLABLE,
            settable: true,
            annotation: None,
        }
    }

    pub fn annotated(mut self, annotation: FieldOverride) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.settable = false;
        self
    }
}

/// A field type the engine can read and assign
pub trait ModelField {
    /// Whether the field accepts "no value" (`Option<T>`)
    const NULLABLE: bool = false;

    fn field_type() -> FieldType
    where
        Self: Sized;

    fn get_value(&self) -> FieldValue;

    /// Assign a value, converting where it is lossless; `false` when rejected
    fn set_value(&mut self, value: FieldValue) -> bool;

    fn as_nested(&mut self) -> Option<NestedTarget<'_>> {
        None
    }
}

/// Object-safe access to a destination model instance
pub trait MapTarget {
    fn type_key(&self) -> TypeKey;

    /// The model's descriptor table, settable and read-only fields alike
    fn describe(&self) -> Vec<FieldDescriptor>;

    fn field_value(&self, name: &str) -> Option<FieldValue>;

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> bool;

    fn nested_target(&mut self, name: &str) -> Option<NestedTarget<'_>>;
}

/// Object-safe access to a destination collection
pub trait CollectionTarget {
    fn item_type(&self) -> TypeKey;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn item(&self, index: usize) -> Option<&dyn MapTarget>;

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn MapTarget>;

    /// Append a default-constructed item and return it
    fn push_default(&mut self) -> &mut dyn MapTarget;
}

/// Handler selected from a complex field's declared type
pub enum NestedTarget<'a> {
    Object(&'a mut dyn MapTarget),
    Collection(&'a mut dyn CollectionTarget),
}

impl<T> CollectionTarget for Vec<T>
where
    T: MapTarget + Default + 'static,
{
    fn item_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn item(&self, index: usize) -> Option<&dyn MapTarget> {
        self.get(index).map(|item| item as &dyn MapTarget)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn MapTarget> {
        self.get_mut(index).map(|item| item as &mut dyn MapTarget)
    }

    fn push_default(&mut self) -> &mut dyn MapTarget {
        self.push(T::default());
        let last = Vec::len(self) - 1;
        &mut self[last]
    }
}

impl<T> ModelField for Vec<T>
where
    T: MapTarget + Default + Send + 'static,
{
    fn field_type() -> FieldType {
        FieldType::Collection
    }

    fn get_value(&self) -> FieldValue {
        FieldValue::Null
    }

    fn set_value(&mut self, value: FieldValue) -> bool {
        match value {
            FieldValue::Object(boxed) => match boxed.downcast::<Vec<T>>() {
                Ok(items) => {
                    *self = *items;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }

    fn as_nested(&mut self) -> Option<NestedTarget<'_>> {
        Some(NestedTarget::Collection(self))
    }
}

/// Implement [`MapTarget`] and [`ModelField`] for a model struct
///
/// Each entry is `PascalName => rust_field`, optionally followed by an
/// annotation override in brackets. Fields listed under `computed` are
/// described as read-only and never assigned.
#[macro_export]
macro_rules! mappable {
    (
        $model:ty {
            $( $name:ident => $field:ident $( [ $annotation:expr ] )? ),* $(,)?
        }
        $( computed { $( $cname:ident => $cfield:ident ),* $(,)? } )?
    ) => {
        impl $crate::model::MapTarget for $model {
            fn type_key(&self) -> $crate::TypeKey {
                $crate::TypeKey::of::<$model>()
            }

            fn describe(&self) -> ::std::vec::Vec<$crate::model::FieldDescriptor> {
                let mut fields = ::std::vec::Vec::new();
                $(
                    #[allow(unused_mut)]
                    let mut descriptor = $crate::model::FieldDescriptor::of(
                        stringify!($name),
                        &self.$field,
                    );
                    $( descriptor = descriptor.annotated($annotation); )?
                    fields.push(descriptor);
                )*
                $( $(
                    fields.push(
                        $crate::model::FieldDescriptor::of(
                            stringify!($cname),
                            &self.$cfield,
                        )
                        .read_only(),
                    );
                )* )?
                fields
            }

            fn field_value(&self, name: &str) -> ::std::option::Option<$crate::FieldValue> {
                $(
                    if name == stringify!($name) {
                        return ::std::option::Option::Some(
                            $crate::model::ModelField::get_value(&self.$field),
                        );
                    }
                )*
                $( $(
                    if name == stringify!($cname) {
                        return ::std::option::Option::Some(
                            $crate::model::ModelField::get_value(&self.$cfield),
                        );
                    }
                )* )?
                ::std::option::Option::None
            }

            fn set_field_value(&mut self, name: &str, value: $crate::FieldValue) -> bool {
                $(
                    if name == stringify!($name) {
                        return $crate::model::ModelField::set_value(&mut self.$field, value);
                    }
                )*
                let _ = value;
                false
            }

            fn nested_target(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<$crate::model::NestedTarget<'_>> {
                $(
                    if name == stringify!($name) {
                        return $crate::model::ModelField::as_nested(&mut self.$field);
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::model::ModelField for $model {
            fn field_type() -> $crate::model::FieldType {
                $crate::model::FieldType::Object
            }

            fn get_value(&self) -> $crate::FieldValue {
                $crate::FieldValue::Null
            }

            fn set_value(&mut self, value: $crate::FieldValue) -> bool {
                match value {
                    $crate::FieldValue::Object(boxed) => match boxed.downcast::<$model>() {
                        ::std::result::Result::Ok(model) => {
                            *self = *model;
                            true
                        }
                        ::std::result::Result::Err(_) => false,
                    },
                    _ => false,
                }
            }

            fn as_nested(&mut self) -> ::std::option::Option<$crate::model::NestedTarget<'_>> {
                ::std::option::Option::Some($crate::model::NestedTarget::Object(self))
            }
        }
    };
}
