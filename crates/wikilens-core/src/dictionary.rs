//! Keyword dictionaries: case-insensitive keyword → annotation maps.
//!
//! Keys are case-folded (see [`fold_keyword`]), so `LLM` and `llm` are the
//! same entry. The annotation keeps the casing it was inserted with. The map
//! is ordered by folded key so iteration and serialisation are deterministic.
//!
//! On disk a dictionary is a JSON array of [`Annotation`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::CoreError;
use crate::annotation::Annotation;
use crate::config::LensConfig;
use crate::detected::DetectedKeyword;
use crate::fold::fold_keyword;
use crate::level::{LevelThresholds, UnderstandingLevel};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Annotation>", into = "Vec<Annotation>")]
pub struct Dictionary {
    entries: BTreeMap<String, Annotation>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `annotation.keyword`.
    ///
    /// Returns the annotation previously stored under the same folded key.
    pub fn insert(&mut self, annotation: Annotation) -> Result<Option<Annotation>, CoreError> {
        if annotation.keyword.trim().is_empty() {
            return Err(CoreError::EmptyKeyword);
        }
        let key = fold_keyword(&annotation.keyword);
        Ok(self.entries.insert(key, annotation))
    }

    pub fn get(&self, keyword: &str) -> Option<&Annotation> {
        self.entries.get(&fold_keyword(keyword))
    }

    /// Lookup by an already-folded key, as carried by scanner segments.
    pub fn get_by_key(&self, key: &str) -> Option<&Annotation> {
        self.entries.get(key)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(&fold_keyword(keyword))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Overwrite-by-key union of two layers; `dynamic` wins on collision.
    pub fn merge(manual: &Dictionary, dynamic: &Dictionary) -> Dictionary {
        let mut entries = manual.entries.clone();
        entries.extend(
            dynamic
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Dictionary { entries }
    }

    /// Build the dynamic layer from validated detection records.
    ///
    /// Later records override earlier ones with the same folded keyword.
    /// Records with a blank keyword are skipped.
    pub fn from_detected(records: &[DetectedKeyword], config: &LensConfig) -> Dictionary {
        let mut dict = Dictionary::new();
        for record in records {
            if let Err(e) = dict.insert(record.to_annotation(config)) {
                warn!(keyword = ?record.keyword, error = %e, "skipping detected keyword");
            }
        }
        dict
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ── Level transitions ──

    pub fn set_level(
        &mut self,
        keyword: &str,
        level: UnderstandingLevel,
    ) -> Result<UnderstandingLevel, CoreError> {
        self.update(keyword, |ann| ann.level = level)
    }

    pub fn cycle_level(&mut self, keyword: &str) -> Result<UnderstandingLevel, CoreError> {
        self.update(keyword, |ann| ann.level = ann.level.cycle())
    }

    pub fn mark_known(&mut self, keyword: &str) -> Result<UnderstandingLevel, CoreError> {
        self.update(keyword, |ann| ann.level = ann.level.mark_known())
    }

    pub fn apply_score(
        &mut self,
        keyword: &str,
        score: f64,
        thresholds: &LevelThresholds,
    ) -> Result<UnderstandingLevel, CoreError> {
        let level = thresholds.level_for(score);
        self.update(keyword, |ann| ann.level = level)
    }

    pub fn set_description(&mut self, keyword: &str, description: &str) -> Result<(), CoreError> {
        self.update(keyword, |ann| ann.set_description(description))
            .map(|_| ())
    }

    fn update(
        &mut self,
        keyword: &str,
        f: impl FnOnce(&mut Annotation),
    ) -> Result<UnderstandingLevel, CoreError> {
        let ann = self
            .entries
            .get_mut(&fold_keyword(keyword))
            .ok_or_else(|| CoreError::UnknownKeyword(keyword.to_string()))?;
        f(ann);
        Ok(ann.level)
    }
}

impl TryFrom<Vec<Annotation>> for Dictionary {
    type Error = CoreError;

    fn try_from(annotations: Vec<Annotation>) -> Result<Self, Self::Error> {
        let mut dict = Dictionary::new();
        for annotation in annotations {
            dict.insert(annotation)?;
        }
        Ok(dict)
    }
}

impl From<Dictionary> for Vec<Annotation> {
    fn from(dict: Dictionary) -> Self {
        dict.entries.into_values().collect()
    }
}
