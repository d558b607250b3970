//! Mapper configuration
//!
//! Configuration can be built in code or loaded from a YAML/JSON file. Every
//! field has a default, so a file only needs the settings it changes.
//!
//! Copyright (c) 2025 Contentmap Team
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings fixed at mapper construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Cache field descriptors per destination type
    pub enable_cache: bool,

    /// Field used to match collection items during reconciliation
    pub identity_field: String,

    /// Append new items for unmatched sources during reconciliation
    pub create_missing_items: bool,

    /// Clear destination collections before reconciliation
    pub clear_before_mapping: bool,

    /// Separator used by concatenation overrides that do not set their own
    pub default_separator: String,

    /// Fall back to case-insensitive key matching in JSON/XML documents
    pub case_insensitive_documents: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            identity_field: "Id".to_string(),
            create_missing_items: true,
            clear_before_mapping: true,
            default_separator: ",".to_string(),
            case_insensitive_documents: true,
        }
    }
}

impl MapperConfig {
    /// Load configuration from a file
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        tracing::debug!(path = %path.display(), "loaded mapper configuration");
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Disable the descriptor cache
    pub fn without_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
