use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: Option<usize>,

    // Engine thresholds
    pub matching: Option<MatchingConfig>,
}

/// `[matching]` section. Unset values keep the engine defaults.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MatchingConfig {
    pub resonance_min_hz: Option<f64>,
    pub resonance_max_hz: Option<f64>,
    pub edge_margin_hz: Option<f64>,
    pub borderline_margin_hz: Option<f64>,
    pub sut_load_multiplier: Option<f64>,
    pub sut_max_load_multiplier: Option<f64>,
    pub mm_sensitivity_min_mv: Option<f64>,
    pub mm_sensitivity_max_mv: Option<f64>,
    pub default_mm_input_impedance: Option<f64>,
    pub weight_compliance_band: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
