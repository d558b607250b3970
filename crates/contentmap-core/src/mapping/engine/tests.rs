//! Tests for property resolution
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, ReferenceKind};
use crate::mapping::{CustomMapping, FieldOverride, Mapper, OverrideSet, ValueGetter};
use crate::source::{ContentItem, ContentTree, JsonNode, NodeRef};
use crate::types::{FieldValue, PropertySet, SourceValue};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, PartialEq)]
struct Author {
    id: i64,
    name: String,
    email: String,
}

crate::mappable! {
    Author {
        Id => id,
        Name => name,
        Email => email,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Child {
    id: i64,
    name: String,
}

crate::mappable! {
    Child {
        Id => id,
        Name => name,
    }
}

#[derive(Debug, Default)]
struct Article {
    id: i64,
    name: String,
    body_text: String,
    summary: String,
    parent_id: i64,
    mapped_from_zero: i32,
    site_title: String,
    author_name: String,
    internal_note: String,
    published: Option<NaiveDateTime>,
    home: Author,
    children: Vec<Child>,
}

crate::mappable! {
    Article {
        Id => id,
        Name => name,
        BodyText => body_text,
        Summary => summary,
        ParentId => parent_id,
        MappedFromZero => mapped_from_zero,
        SiteTitle => site_title,
        AuthorName => author_name,
        InternalNote => internal_note [FieldOverride::new().ignore()],
        Published => published,
        Home => home,
        Children => children,
    }
}

fn tree() -> ContentTree {
    ContentTree::from_items(vec![
        ContentItem::new(1001, "Home")
            .property("siteTitle", "My site")
            .property("category", "home"),
        ContentItem::new(1000, "Test content")
            .parent(1001)
            .property("bodyText", "This is the body text")
            .property("summaryText", "")
            .property("zeroInt", 0i64)
            .property("category", "News")
            .property("author", "1002")
            .property("internalNote", "from source")
            .property("published", "0001-01-01T00:00:00"),
        ContentItem::new(1002, "Jane Doe")
            .parent(1001)
            .property("email", "jane@example.com")
            .property("category", "staff"),
        ContentItem::new(1003, "Child one").parent(1000),
        ContentItem::new(1004, "Child two").parent(1000),
    ])
}

fn content() -> NodeRef {
    tree().node(1000).unwrap()
}

fn map(mapper: &Mapper, node: &NodeRef, overrides: &OverrideSet) -> Article {
    let mut article = Article::default();
    mapper.map(node.as_ref(), &mut article, overrides).unwrap();
    article
}

fn constant(text: &'static str) -> CustomMapping {
    CustomMapping::node(move |_, _, _, _| Ok(Some(FieldValue::from(text))))
}

#[test]
fn test_convention_mapping() {
    let article = map(&Mapper::new(), &content(), &OverrideSet::new());

    assert_eq!(article.id, 1000);
    assert_eq!(article.name, "Test content");
    assert_eq!(article.body_text, "This is the body text");
    assert_eq!(article.summary, "");
    assert_eq!(article.site_title, "");
    assert_eq!(article.published, None);
    assert_eq!(article.home, Author::default());
}

#[test]
fn test_native_children_fill_nested_collection() {
    let article = map(&Mapper::new(), &content(), &OverrideSet::new());

    assert_eq!(
        article.children,
        vec![
            Child { id: 1003, name: "Child one".to_string() },
            Child { id: 1004, name: "Child two".to_string() },
        ]
    );
}

#[test]
fn test_default_applies_when_unresolved() {
    let overrides = OverrideSet::new().with(
        "Summary",
        FieldOverride::new().source("nothingHere").default_value("fallback"),
    );
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.summary, "fallback");
}

#[test]
fn test_real_zero_beats_default() {
    let overrides = OverrideSet::new().with(
        "MappedFromZero",
        FieldOverride::new().source("zeroInt").default_value(1),
    );
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.mapped_from_zero, 0);
}

#[test]
fn test_annotation_ignore_cannot_be_cleared() {
    let explicit = FieldOverride {
        ignore: Some(false),
        ..FieldOverride::default()
    };
    let overrides = OverrideSet::new().with("InternalNote", explicit);

    let mut article = Article {
        internal_note: "keep".to_string(),
        ..Article::default()
    };
    Mapper::new().map(content().as_ref(), &mut article, &overrides).unwrap();
    assert_eq!(article.internal_note, "keep");
}

#[test]
fn test_ancestor_field() {
    let overrides = OverrideSet::new().with("ParentId", FieldOverride::new().source("Id").levels_above(1));
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.parent_id, 1001);

    let root = tree().node(1001).unwrap();
    let article = map(&Mapper::new(), &root, &overrides);
    assert_eq!(article.parent_id, 0);
}

#[test]
fn test_ancestor_hoists_nested_object() {
    let overrides = OverrideSet::new().with("Home", FieldOverride::new().levels_above(1));
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.home.id, 1001);
    assert_eq!(article.home.name, "Home");
}

#[test]
fn test_condition_is_case_insensitive() {
    let overrides = OverrideSet::new().with(
        "SiteTitle",
        FieldOverride::new().source("category").map_if("category", "NEWS"),
    );
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.site_title, "News");
}

#[test]
fn test_condition_mismatch_keeps_default() {
    let overrides = OverrideSet::new().with(
        "SiteTitle",
        FieldOverride::new()
            .source("category")
            .map_if("category", "sports")
            .default_value("n/a"),
    );
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.site_title, "n/a");
}

#[test]
fn test_recursive_lookup() {
    let overrides = OverrideSet::new().with("SiteTitle", FieldOverride::new().map_recursively());
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.site_title, "My site");
}

#[test]
fn test_related_node_by_id() {
    let overrides = OverrideSet::new().with("AuthorName", FieldOverride::new().source("author").related("Name"));
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.author_name, "Jane Doe");
}

#[test]
fn test_condition_checked_on_related_node() {
    let matching = OverrideSet::new().with(
        "AuthorName",
        FieldOverride::new()
            .source("author")
            .related("email")
            .map_if("category", "staff"),
    );
    let article = map(&Mapper::new(), &content(), &matching);
    assert_eq!(article.author_name, "jane@example.com");

    // The content node itself matches "News", the related node does not
    let mismatching = OverrideSet::new().with(
        "AuthorName",
        FieldOverride::new()
            .source("author")
            .related("email")
            .map_if("category", "News"),
    );
    let article = map(&Mapper::new(), &content(), &mismatching);
    assert_eq!(article.author_name, "");
}

#[test]
fn test_child_drill_down() {
    let node = JsonNode::parse(r#"{"author": {"name": "Jane", "email": "jane@example.com"}}"#).unwrap();
    let overrides = OverrideSet::new().with("AuthorName", FieldOverride::new().source("author").child("name"));
    let article = map(&Mapper::new(), &node, &overrides);
    assert_eq!(article.author_name, "Jane");
}

#[test]
fn test_nested_object_keeps_existing_instance() {
    let node = JsonNode::parse(r#"{"home": {"id": 5, "name": "Nested"}}"#).unwrap();
    let mut article = Article {
        home: Author {
            email: "seeded@example.com".to_string(),
            ..Author::default()
        },
        ..Article::default()
    };
    Mapper::new().map(node.as_ref(), &mut article, &OverrideSet::new()).unwrap();

    assert_eq!(
        article.home,
        Author {
            id: 5,
            name: "Nested".to_string(),
            email: "seeded@example.com".to_string(),
        }
    );
}

#[test]
fn test_registry_precedence() {
    let mapper = Mapper::new();
    mapper.add_custom_mapping::<String>(constant("type"), None);
    mapper.add_custom_mapping::<String>(constant("field"), Some("Summary"));

    let article = map(&mapper, &content(), &OverrideSet::new());
    assert_eq!(article.summary, "field");
    assert_eq!(article.body_text, "type");
    // Native fields resolve before custom mappings
    assert_eq!(article.name, "Test content");

    let overrides = OverrideSet::new().with("Summary", FieldOverride::new().custom_mapping(constant("explicit")));
    let article = map(&mapper, &content(), &overrides);
    assert_eq!(article.summary, "explicit");
}

#[test]
fn test_no_opinion_falls_through() {
    let mapper = Mapper::new();
    mapper.add_custom_mapping::<String>(constant("type"), None);
    mapper.add_custom_mapping::<String>(CustomMapping::node(|_, _, _, _| Ok(None)), Some("Summary"));

    let article = map(&mapper, &content(), &OverrideSet::new());
    assert_eq!(article.summary, "type");
}

#[test]
fn test_value_mapping_receives_raw_value() {
    let shout = CustomMapping::value(|_, raw| Ok(raw.as_text().map(|text| FieldValue::Text(text.to_uppercase()))));
    let overrides = OverrideSet::new().with("BodyText", FieldOverride::new().custom_mapping(shout));
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.body_text, "THIS IS THE BODY TEXT");
}

#[test]
fn test_failing_custom_mapping_is_an_error() {
    let failing = CustomMapping::node(|_, _, _, _| Err(anyhow::anyhow!("boom")));
    let overrides = OverrideSet::new().with("BodyText", FieldOverride::new().custom_mapping(failing));

    let mut article = Article::default();
    let err = Mapper::new()
        .map(content().as_ref(), &mut article, &overrides)
        .unwrap_err();
    assert!(matches!(err, Error::CustomMapping { ref field, .. } if field == "BodyText"));
}

#[test]
fn test_named_functions() {
    let mapper = Mapper::builder()
        .with_formatter("shout", |s| s.to_uppercase())
        .with_named_mapping("constant", constant("named"))
        .with_value_getter("fixed", ValueGetter::new(|_, _, _| Some(SourceValue::text("from getter"))))
        .build();
    let overrides = OverrideSet::new()
        .with("BodyText", FieldOverride::new().formatter_ref("shout"))
        .with("Summary", FieldOverride::new().custom_mapping_ref("constant"))
        .with("SiteTitle", FieldOverride::new().value_getter_ref("fixed"));

    let article = map(&mapper, &content(), &overrides);
    assert_eq!(article.body_text, "THIS IS THE BODY TEXT");
    assert_eq!(article.summary, "named");
    assert_eq!(article.site_title, "from getter");
}

#[test]
fn test_unregistered_references_fail() {
    let cases = [
        (FieldOverride::new().formatter_ref("missing"), ReferenceKind::Formatter),
        (FieldOverride::new().custom_mapping_ref("missing"), ReferenceKind::CustomMapping),
        (FieldOverride::new().value_getter_ref("missing"), ReferenceKind::ValueGetter),
    ];

    for (field_override, expected) in cases {
        let overrides = OverrideSet::new().with("BodyText", field_override);
        let mut article = Article::default();
        let err = Mapper::new()
            .map(content().as_ref(), &mut article, &overrides)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { kind, .. } if kind == expected));
    }
}

#[test]
fn test_value_getter_closure() {
    let getter = ValueGetter::new(|node, name, recursive| node.custom_field(&format!("{name}Text"), recursive));
    let overrides = OverrideSet::new().with("Summary", FieldOverride::new().source("body").value_getter(getter));
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.summary, "This is the body text");
}

#[test]
fn test_dictionary_key() {
    let mut dictionary = HashMap::new();
    dictionary.insert("Article.Summary".to_string(), "Localised summary".to_string());
    let mapper = Mapper::builder().with_dictionary(Arc::new(dictionary)).build();

    let overrides = OverrideSet::new().with("Summary", FieldOverride::new().dictionary_key("Article.Summary"));
    let article = map(&mapper, &content(), &overrides);
    assert_eq!(article.summary, "Localised summary");

    // Without a dictionary the field is left alone
    let article = map(&Mapper::new(), &content(), &overrides);
    assert_eq!(article.summary, "");
}

#[test]
fn test_property_set_filter() {
    let mapper = Mapper::new();

    let mut native = Article::default();
    mapper
        .map_with(content().as_ref(), &mut native, &OverrideSet::new(), PropertySet::Native)
        .unwrap();
    assert_eq!(native.id, 1000);
    assert_eq!(native.body_text, "");
    assert_eq!(native.children.len(), 2);

    let mut custom = Article::default();
    mapper
        .map_with(content().as_ref(), &mut custom, &OverrideSet::new(), PropertySet::Custom)
        .unwrap();
    assert_eq!(custom.id, 0);
    assert_eq!(custom.name, "");
    assert_eq!(custom.body_text, "This is the body text");
}

#[test]
fn test_recursive_lookup_on_parent_cycle() {
    let cyclic = ContentTree::from_items(vec![
        ContentItem::new(1, "First").parent(2),
        ContentItem::new(2, "Second").parent(1),
    ]);
    let overrides = OverrideSet::new().with("BodyText", FieldOverride::new().source("missing").map_recursively());

    let article = map(&Mapper::new(), &cyclic.node(1).unwrap(), &overrides);

    assert_eq!(article.body_text, "");
    assert_eq!(article.name, "First");
}

#[test]
fn test_concatenation_wins_over_coalesce() {
    let overrides = OverrideSet::new().with(
        "Summary",
        FieldOverride::new()
            .coalesce(["summaryText", "bodyText"])
            .concatenate(["Name", "bodyText"], " / "),
    );

    let article = map(&Mapper::new(), &content(), &overrides);

    assert_eq!(article.summary, "Test content / This is the body text");
}

#[derive(Debug, Default)]
struct Headline {
    title: String,
}

crate::mappable! {
    Headline {
        Title => title [FieldOverride::new().concatenate(["Name", "bodyText"], ", ")],
    }
}

#[test]
fn test_annotated_concatenation_wins_over_explicit_coalesce() {
    let overrides = OverrideSet::new().with("Title", FieldOverride::new().coalesce(["bodyText"]));
    let mut headline = Headline::default();

    Mapper::new().map(content().as_ref(), &mut headline, &overrides).unwrap();

    assert_eq!(headline.title, "Test content, This is the body text");
}
