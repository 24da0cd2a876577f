use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wb_core::constants::{SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH};
use wb_core::{NlpProcessor, SummaryBounds};

pub const CONFIG_FILE_NAME: &str = "wb.toml";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Tasks listed on the index page and by `wb recent`.
    pub recent_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            recent_limit: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model name recorded when a request names none.
    pub default_model: String,
    /// Summary word bounds.
    pub summary_max_length: usize,
    pub summary_min_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_model: "bert-base-uncased".to_string(),
            summary_max_length: SUMMARY_MAX_LENGTH,
            summary_min_length: SUMMARY_MIN_LENGTH,
        }
    }
}

impl AnalysisConfig {
    pub fn processor(&self) -> NlpProcessor {
        NlpProcessor::new().with_summary_bounds(SummaryBounds {
            max_length: self.summary_max_length,
            min_length: self.summary_min_length,
        })
    }
}

/// Data directory: `WB_DATA_DIR` or `~/.nlp-workbench`.
pub fn data_dir() -> PathBuf {
    std::env::var("WB_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(wb_store::default_base_dir)
}

/// Load an explicit config file, or `<data_dir>/wb.toml` when present.
///
/// An explicit path must exist; the implicit one falls back to defaults.
pub fn load(explicit: Option<&Path>, data_dir: &Path) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = data_dir.join(CONFIG_FILE_NAME);
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse(&raw).with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

pub fn parse(raw: &str) -> Result<Config> {
    Ok(toml::from_str(raw)?)
}
