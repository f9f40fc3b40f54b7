mod file_config;

pub use file_config::{FileConfig, MatchingConfig};

use crate::matching::MatchingSettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: usize,

    pub matching: MatchingSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size).max(1);

        let matching = resolve_matching(file.matching.unwrap_or_default());
        matching
            .validate()
            .context("Invalid [matching] configuration")?;

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            frontend_dir_path,
            read_pool_size,
            matching,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }
}

/// Merge the `[matching]` section over the engine defaults.
fn resolve_matching(file: MatchingConfig) -> MatchingSettings {
    let defaults = MatchingSettings::default();
    MatchingSettings {
        resonance_min_hz: file.resonance_min_hz.unwrap_or(defaults.resonance_min_hz),
        resonance_max_hz: file.resonance_max_hz.unwrap_or(defaults.resonance_max_hz),
        edge_margin_hz: file.edge_margin_hz.unwrap_or(defaults.edge_margin_hz),
        borderline_margin_hz: file
            .borderline_margin_hz
            .unwrap_or(defaults.borderline_margin_hz),
        sut_load_multiplier: file
            .sut_load_multiplier
            .unwrap_or(defaults.sut_load_multiplier),
        sut_max_load_multiplier: file
            .sut_max_load_multiplier
            .unwrap_or(defaults.sut_max_load_multiplier),
        mm_sensitivity_min_mv: file
            .mm_sensitivity_min_mv
            .unwrap_or(defaults.mm_sensitivity_min_mv),
        mm_sensitivity_max_mv: file
            .mm_sensitivity_max_mv
            .unwrap_or(defaults.mm_sensitivity_max_mv),
        default_mm_input_impedance: file
            .default_mm_input_impedance
            .unwrap_or(defaults.default_mm_input_impedance),
        weight_compliance_band: file
            .weight_compliance_band
            .unwrap_or(defaults.weight_compliance_band),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
