//! Contentmap Core - convention-driven mapping of content onto typed models
//!
//! This crate copies data from hierarchical content nodes, JSON documents, XML
//! fragments and key/value tables onto statically typed destination models.
//! Fields are matched by naming convention; per-field overrides (declared on
//! the model or passed per call) redirect, combine, convert or skip values.
//!
//! # Main Components
//!
//! - **Model**: descriptor tables declared with [`mappable!`]
//! - **Sources**: the [`ContentNode`] contract and its JSON, XML, table and tree adapters
//! - **Mapping**: the [`Mapper`], its overrides, value coercion and collection reconciliation
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//!
//! # Example
//!
//! ```
//! use contentmap_core::{mappable, FieldOverride, Mapper, OverrideSet, Result};
//!
//! #[derive(Debug, Default)]
//! struct Teaser {
//!     title: String,
//!     summary: String,
//! }
//!
//! mappable! {
//!     Teaser {
//!         Title => title,
//!         Summary => summary,
//!     }
//! }
//!
//! fn example() -> Result<()> {
//!     let overrides = OverrideSet::new()
//!         .with("Summary", FieldOverride::new().coalesce(["summaryText", "bodyText"]));
//!
//!     let mut teaser = Teaser::default();
//!     Mapper::new().map_json(
//!         r#"{"title": "Hello", "summaryText": "", "bodyText": "Body"}"#,
//!         &mut teaser,
//!         &overrides,
//!     )?;
//!
//!     assert_eq!(teaser.title, "Hello");
//!     assert_eq!(teaser.summary, "Body");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod naming;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use config::MapperConfig;
pub use error::{Error, ReferenceKind, Result};
pub use mapping::{
    CollectionOptions, Concatenation, CustomMapping, FieldOverride, Formatter, Mapper, MapperBuilder,
    OverrideSet, PropertyCondition, ValueGetter,
};
pub use model::{FieldDescriptor, FieldType, FileReference, MapTarget, ModelField, ScalarKind};
pub use source::{ContentNode, DictionaryLookup, NodeRef};
pub use types::{sentinel_date, FieldValue, PropertySet, RichText, SourceValue, TypeKey, ValueOrigin};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
