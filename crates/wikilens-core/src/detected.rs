//! Detected-keyword records returned by the keyword-detection service.
//!
//! The service answers with a JSON array (or an object with a `keywords`
//! array) of records shaped like
//!
//! ```json
//! {
//!   "keyword": "LLM agent",
//!   "knowledge_level": 0.42,
//!   "related_documents": [
//!     { "file_name": "agents.pdf", "page_number": 12, "text": "An agent ..." }
//!   ]
//! }
//! ```
//!
//! Records are validated one at a time. A record without a usable keyword or
//! with a non-numeric score is dropped with a warning; missing optional
//! fields fall back to defaults. One bad record never discards the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::CoreError;
use crate::annotation::{Annotation, Reference};
use crate::config::LensConfig;

const UNTITLED_DOCUMENT: &str = "untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedDocument {
    pub file_name: String,
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedKeyword {
    pub keyword: String,
    /// Knowledge score clamped to `[0, 1]`.
    pub knowledge_level: f64,
    pub related_documents: Vec<RelatedDocument>,
}

impl DetectedKeyword {
    /// Validate one raw record.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::InvalidRecord("record is not an object".into()))?;

        let keyword = obj
            .get("keyword")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CoreError::InvalidRecord("missing or blank keyword".into()))?
            .to_string();

        let knowledge_level = match obj.get("knowledge_level") {
            None | Some(Value::Null) => 0.0,
            Some(v) => v
                .as_f64()
                .filter(|score| score.is_finite())
                .ok_or_else(|| {
                    CoreError::InvalidRecord(format!("non-numeric knowledge_level for {keyword:?}"))
                })?
                .clamp(0.0, 1.0),
        };

        let related_documents = match obj.get("related_documents") {
            Some(Value::Array(docs)) => docs.iter().filter_map(RelatedDocument::from_value).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            keyword,
            knowledge_level,
            related_documents,
        })
    }

    /// Convert into an annotation using the detection thresholds.
    ///
    /// The first related document becomes the primary reference (with its
    /// text cut to `excerpt_chars` characters), the rest become additional
    /// references in order. Without documents a default reference is used.
    pub fn to_annotation(&self, config: &LensConfig) -> Annotation {
        let level = config.detection.level_for(self.knowledge_level);
        let mut docs = self.related_documents.iter().map(|doc| {
            Reference::new(
                doc.file_name.clone(),
                doc.page_number,
                excerpt(&doc.text, config.excerpt_chars),
            )
        });

        let reference = match docs.next() {
            Some(primary) => docs.fold(primary, Reference::with_additional),
            None => Reference::new(
                config.default_reference_title.clone(),
                0,
                config.default_reference_description.clone(),
            ),
        };

        Annotation::new(self.keyword.clone(), level, reference)
    }
}

impl RelatedDocument {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = obj.get("text").and_then(Value::as_str)?.to_string();
        let file_name = obj
            .get("file_name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNTITLED_DOCUMENT)
            .to_string();
        let page_number = obj
            .get("page_number")
            .and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0);
        Some(Self {
            file_name,
            page_number,
            text,
        })
    }
}

/// Validate a batch of raw records, dropping (and logging) the invalid ones.
pub fn validate_records(values: &[Value]) -> Vec<DetectedKeyword> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match DetectedKeyword::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "dropping detected-keyword record");
                None
            }
        })
        .collect()
}

/// Parse a service response body into validated records.
///
/// Accepts a top-level array or an object holding a `keywords` array.
pub fn parse_records(body: &str) -> Result<Vec<DetectedKeyword>, CoreError> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Array(items) => Ok(validate_records(&items)),
        Value::Object(mut obj) => match obj.remove("keywords") {
            Some(Value::Array(items)) => Ok(validate_records(&items)),
            _ => Err(CoreError::InvalidRecord(
                "response object has no keywords array".into(),
            )),
        },
        _ => Err(CoreError::InvalidRecord(
            "response is neither an array nor an object".into(),
        )),
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
