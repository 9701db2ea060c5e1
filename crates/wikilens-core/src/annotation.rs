//! Annotation records attached to dictionary keywords.

use serde::{Deserialize, Serialize};

use crate::level::UnderstandingLevel;

/// A citation explaining a keyword.
///
/// Secondary references share the same shape and keep their order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub page: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_references: Vec<Reference>,
}

impl Reference {
    pub fn new(title: impl Into<String>, page: u32, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page,
            description: description.into(),
            additional_references: Vec::new(),
        }
    }

    pub fn with_additional(mut self, reference: Reference) -> Self {
        self.additional_references.push(reference);
        self
    }
}

/// Understanding level and reference metadata for one keyword.
///
/// `keyword` keeps the casing it was entered with; it is only used for
/// display. Matching against text is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub keyword: String,
    #[serde(default)]
    pub level: UnderstandingLevel,
    pub reference: Reference,
}

impl Annotation {
    pub fn new(keyword: impl Into<String>, level: UnderstandingLevel, reference: Reference) -> Self {
        Self {
            keyword: keyword.into(),
            level,
            reference,
        }
    }

    /// Replace the primary reference's description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.reference.description = description.into();
    }
}
