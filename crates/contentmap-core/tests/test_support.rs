//! Shared test support utilities for integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use contentmap_core::source::{ContentItem, ContentTree};
use contentmap_core::{mappable, FieldOverride, FileReference, NodeRef, RichText};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub const CONTENT_ID: i64 = 1000;
pub const PARENT_ID: i64 = 1001;
pub const RELATED_ID: i64 = 1002;
pub const IMAGE_ID: i64 = 2001;

/// Install a test subscriber once; `RUST_LOG=contentmap_core=trace` shows decisions
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

/// The standard fixture tree with the given summary text on the content node
pub fn content_tree(summary_text: &str) -> ContentTree {
    ContentTree::from_items(vec![
        ContentItem::new(PARENT_ID, "Parent page").property("siteName", "Example site"),
        ContentItem::new(CONTENT_ID, "Test content")
            .parent(PARENT_ID)
            .native("CreateDate", created())
            .property("bodyText", "This is the body text")
            .property("summaryText", summary_text)
            .property("zeroInt", 0i64)
            .property("emptyDate", "0001-01-01T00:00:00")
            .property("rating", 4.5)
            .property("isFeatured", "1")
            .property("relatedPage", RELATED_ID.to_string())
            .property("heroImage", IMAGE_ID.to_string()),
        ContentItem::new(RELATED_ID, "Related page")
            .parent(PARENT_ID)
            .property("bodyText", "Related body"),
        ContentItem::new(IMAGE_ID, "hero.jpg")
            .native("Url", "/media/hero.jpg")
            .property("umbracoExtension", "jpg")
            .property("umbracoBytes", 20480i64)
            .property("umbracoWidth", 1200i64)
            .property("umbracoHeight", 630i64),
    ])
}

/// The content node of the standard fixture
pub fn content_node() -> NodeRef {
    content_tree("").node(CONTENT_ID).unwrap()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimpleViewModel {
    pub id: i64,
    pub name: String,
}

mappable! {
    SimpleViewModel {
        Id => id,
        Name => name,
    }
}

/// A model without an identity field
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NameOnlyViewModel {
    pub name: String,
}

mappable! {
    NameOnlyViewModel {
        Name => name,
    }
}

#[derive(Debug, Default)]
pub struct ContentViewModel {
    pub id: i64,
    pub name: String,
    pub body_text: RichText,
    pub summary: String,
    pub parent_id: i64,
    pub mapped_from_zero: i32,
    pub empty_date: Option<NaiveDateTime>,
    pub create_date: Option<NaiveDateTime>,
    pub rating: f64,
    pub is_featured: bool,
    pub hero_image: FileReference,
    pub related_body: String,
    pub site_name: String,
}

mappable! {
    ContentViewModel {
        Id => id,
        Name => name,
        BodyText => body_text,
        Summary => summary [FieldOverride::new().coalesce(["summaryText", "bodyText"])],
        ParentId => parent_id [FieldOverride::new().source("Id").levels_above(1)],
        MappedFromZero => mapped_from_zero [FieldOverride::new().source("zeroInt").default_value(1)],
        EmptyDate => empty_date,
        CreateDate => create_date,
        Rating => rating,
        IsFeatured => is_featured,
        HeroImage => hero_image,
        RelatedBody => related_body [FieldOverride::new().source("relatedPage").related("bodyText")],
        SiteName => site_name [FieldOverride::new().map_recursively()],
    }
}

/// A model with every field left to the per-call overrides
#[derive(Debug, Default)]
pub struct FlexibleViewModel {
    pub id: i64,
    pub name: String,
    pub heading: String,
    pub summary: String,
    pub parent_id: i64,
    pub count: i32,
}

mappable! {
    FlexibleViewModel {
        Id => id,
        Name => name,
        Heading => heading,
        Summary => summary,
        ParentId => parent_id,
        Count => count,
    }
}
