//! Built-in model for a referenced file (an image or document node)
//!
//! Fields of this type are filled by the file reference mapping the mapper
//! seeds at construction: the source field holds the file node (or its id) and
//! the referenced node is mapped onto a `FileReference`.

use crate::mapping::FieldOverride;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileReference {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub alt_text: String,
    pub extension: String,
    pub size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

crate::mappable! {
    FileReference {
        Id => id,
        Name => name,
        Url => url,
        AltText => alt_text,
        Extension => extension [FieldOverride::new().source("umbracoExtension")],
        Size => size [FieldOverride::new().source("umbracoBytes")],
        Width => width [FieldOverride::new().source("umbracoWidth")],
        Height => height [FieldOverride::new().source("umbracoHeight")],
    }
}

impl FileReference {
    /// Whether the reference was resolved to a file
    pub fn is_resolved(&self) -> bool {
        self.id != 0 || !self.url.is_empty()
    }
}
