use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::screenplay::SegmenterConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Scene segmentation settings
    #[serde(default)]
    pub segmentation: SegmenterConfig,

    /// Where sessions and projects are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Token pricing used for cost tracking
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Storage locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    // @field: JSON file holding the current editing session
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    // @field: SQLite project database; platform data dir when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            database_path: None,
        }
    }
}

/// Pricing of the text-generation API, in USD per million tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PricingConfig {
    /// Price per million prompt tokens
    #[serde(default = "default_input_price")]
    pub input_usd_per_million: f64,

    /// Price per million generated tokens
    #[serde(default = "default_output_price")]
    pub output_usd_per_million: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_usd_per_million: default_input_price(),
            output_usd_per_million: default_output_price(),
        }
    }
}

impl PricingConfig {
    /// Cost in USD of a single request
    pub fn cost_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * self.input_usd_per_million
            + (output_tokens as f64 / 1_000_000.0) * self.output_usd_per_million
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_session_file() -> PathBuf {
    PathBuf::from("data").join("current_session.json")
}

fn default_input_price() -> f64 {
    0.075
}

fn default_output_price() -> f64 {
    0.30
}

impl Config {
    /// Load the configuration from `path`, writing a default one when the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        crate::file_utils::FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.fallback_header.trim().is_empty() {
            return Err(anyhow!("segmentation.fallback_header must not be empty"));
        }

        if self.pricing.input_usd_per_million < 0.0 || self.pricing.output_usd_per_million < 0.0 {
            return Err(anyhow!("Token prices must not be negative"));
        }

        if self.storage.session_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.session_file must not be empty"));
        }

        Ok(())
    }
}
