//! Configuration loading for wikilens.
//!
//! Reads a TOML file (path from `--config` or `WIKILENS_CONFIG`). Every
//! field has a default, so a missing file or an empty one yields a usable
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CoreError;
use crate::level::LevelThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    /// Whether lens mode starts switched on.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_detection")]
    pub detection: LevelThresholds,
    #[serde(default = "default_study")]
    pub study: LevelThresholds,
    /// Characters of document text kept in a detected keyword's reference.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_reference_title")]
    pub default_reference_title: String,
    #[serde(default = "default_reference_description")]
    pub default_reference_description: String,
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_enabled()               -> bool { true }
fn default_detection()             -> LevelThresholds { LevelThresholds::DETECTION }
fn default_study()                 -> LevelThresholds { LevelThresholds::STUDY }
fn default_excerpt_chars()         -> usize { 300 }
fn default_reference_title()       -> String { "Auto-detected keyword".to_string() }
fn default_reference_description() -> String { "This keyword was automatically detected.".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url()     -> String { "http://localhost:8000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            detection: default_detection(),
            study: default_study(),
            excerpt_chars: default_excerpt_chars(),
            default_reference_title: default_reference_title(),
            default_reference_description: default_reference_description(),
            api: ApiConfig::default(),
        }
    }
}

impl LensConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.detection.validate()?;
        self.study.validate()?;
        Ok(())
    }
}
