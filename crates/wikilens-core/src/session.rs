//! Lens session: the manual and detected dictionary layers plus lens mode.
//!
//! The session is the single owner of annotation state. Each scan pass asks
//! for a fresh merged snapshot via [`LensSession::dictionary`] and hands it to
//! the scanner; nothing is cached between passes.
//!
//! Level changes are computed from the level currently visible in the merged
//! view and then written to every layer holding the keyword, so the next
//! snapshot shows the new level whichever layer wins the merge.

use tracing::{debug, info};

use crate::CoreError;
use crate::annotation::Reference;
use crate::config::LensConfig;
use crate::detected::DetectedKeyword;
use crate::dictionary::Dictionary;
use crate::level::UnderstandingLevel;

pub struct LensSession {
    config: LensConfig,
    enabled: bool,
    manual: Dictionary,
    detected: Dictionary,
}

impl LensSession {
    pub fn new(config: LensConfig, manual: Dictionary) -> Self {
        Self {
            enabled: config.enabled,
            config,
            manual,
            detected: Dictionary::new(),
        }
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn manual(&self) -> &Dictionary {
        &self.manual
    }

    pub fn detected(&self) -> &Dictionary {
        &self.detected
    }

    /// Rebuild the detected layer. An empty batch (e.g. after a failed
    /// fetch) clears it and leaves the manual layer as the only source.
    pub fn replace_detected(&mut self, records: &[DetectedKeyword]) {
        self.detected = Dictionary::from_detected(records, &self.config);
        info!(
            detected = self.detected.len(),
            manual = self.manual.len(),
            "detected keywords replaced"
        );
    }

    /// Merged snapshot for one scan pass; detected entries win.
    pub fn dictionary(&self) -> Dictionary {
        Dictionary::merge(&self.manual, &self.detected)
    }

    /// Reference for a keyword as the merged view shows it.
    pub fn reference(&self, keyword: &str) -> Option<&Reference> {
        self.detected
            .get(keyword)
            .or_else(|| self.manual.get(keyword))
            .map(|ann| &ann.reference)
    }

    pub fn level(&self, keyword: &str) -> Option<UnderstandingLevel> {
        self.detected
            .get(keyword)
            .or_else(|| self.manual.get(keyword))
            .map(|ann| ann.level)
    }

    pub fn cycle(&mut self, keyword: &str) -> Result<UnderstandingLevel, CoreError> {
        let next = self.visible_level(keyword)?.cycle();
        self.set_level(keyword, next)
    }

    pub fn mark_known(&mut self, keyword: &str) -> Result<UnderstandingLevel, CoreError> {
        let next = self.visible_level(keyword)?.mark_known();
        self.set_level(keyword, next)
    }

    /// Map a study score through the study thresholds and apply it.
    pub fn apply_study_score(
        &mut self,
        keyword: &str,
        score: f64,
    ) -> Result<UnderstandingLevel, CoreError> {
        self.visible_level(keyword)?;
        let next = self.config.study.level_for(score);
        debug!(keyword, score, level = %next, "applying study score");
        self.set_level(keyword, next)
    }

    pub fn set_description(&mut self, keyword: &str, description: &str) -> Result<(), CoreError> {
        self.visible_level(keyword)?;
        for layer in [&mut self.manual, &mut self.detected] {
            if layer.contains(keyword) {
                layer.set_description(keyword, description)?;
            }
        }
        Ok(())
    }

    fn visible_level(&self, keyword: &str) -> Result<UnderstandingLevel, CoreError> {
        self.level(keyword)
            .ok_or_else(|| CoreError::UnknownKeyword(keyword.to_string()))
    }

    fn set_level(
        &mut self,
        keyword: &str,
        level: UnderstandingLevel,
    ) -> Result<UnderstandingLevel, CoreError> {
        for layer in [&mut self.manual, &mut self.detected] {
            if layer.contains(keyword) {
                layer.set_level(keyword, level)?;
            }
        }
        Ok(level)
    }
}
