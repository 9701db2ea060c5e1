//! Dictionary files on disk: JSON arrays of annotations.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;
use wikilens_core::{DetectedKeyword, Dictionary};

pub fn load_dictionary(path: &Path) -> anyhow::Result<Dictionary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading dictionary {}", path.display()))?;
    Dictionary::from_json(&raw).with_context(|| format!("parsing dictionary {}", path.display()))
}

/// Write `dict` to `path` through a temp file in the same directory, so a
/// crash never leaves a half-written dictionary behind.
pub fn save_dictionary(dict: &Dictionary, path: &Path) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let json = dict.to_json()?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("replacing dictionary {}", path.display()))?;
    Ok(())
}

/// Load a saved keyword-detection response (offline alternative to `--detect`).
pub fn load_detected(path: &Path) -> anyhow::Result<Vec<DetectedKeyword>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading detected keywords {}", path.display()))?;
    wikilens_core::parse_records(&raw)
        .with_context(|| format!("parsing detected keywords {}", path.display()))
}
