//! Configuration management for the sales forecast dashboard

use crate::feature_extractor::WeekdayConvention;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Historical sales input
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with date, store, item, sales columns
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/train.csv".to_string(),
        }
    }
}

/// Pre-trained regressor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Name used in logs
    pub name: String,
    /// ONNX export of the trained model
    pub path: String,
    /// JSON sidecar pinning the feature schema
    pub schema_path: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
    /// Weekday encoding the feature builder uses; checked against the schema
    pub weekday_origin: WeekdayConvention,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "random_forest".to_string(),
            path: "models/random_forest.onnx".to_string(),
            schema_path: "models/random_forest.schema.json".to_string(),
            onnx_threads: 1,
            weekday_origin: WeekdayConvention::Monday,
        }
    }
}

/// Interactive session display settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rows shown in the data preview
    pub preview_rows: usize,
    /// Bins in the sales distribution
    pub histogram_bins: usize,
    /// Store/item combinations listed on the dashboard
    pub top_combinations: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 30,
            top_combinations: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location; a missing file falls
    /// back to defaults.
    pub fn load() -> Result<Self> {
        Self::build(File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("SALES_FORECAST").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.dataset.path, "data/train.csv");
        assert_eq!(config.model.path, "models/random_forest.onnx");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.model.weekday_origin, WeekdayConvention::Monday);
        assert_eq!(config.session.histogram_bins, 30);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!(
            "sales_forecast_config_{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[dataset]\npath = \"fixtures/train.csv\"\n\n[model]\nname = \"fixture_forest\"\n"
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.dataset.path, "fixtures/train.csv");
        assert_eq!(config.model.name, "fixture_forest");
        assert_eq!(config.model.path, "models/random_forest.onnx");
        assert_eq!(config.session.preview_rows, 5);
    }

    #[test]
    fn test_weekday_origin_from_file() {
        let path = std::env::temp_dir().join(format!(
            "sales_forecast_weekday_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[model]\nweekday_origin = \"sunday\"\n").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.model.weekday_origin, WeekdayConvention::Sunday);
    }

    #[test]
    fn test_env_overrides_file() {
        let path = std::env::temp_dir().join(format!(
            "sales_forecast_env_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[model]\nonnx_threads = 2\n").unwrap();

        // No other test reads onnx_threads from a loaded config.
        std::env::set_var("SALES_FORECAST__MODEL__ONNX_THREADS", "3");
        let config = AppConfig::load_from_path(&path);
        std::env::remove_var("SALES_FORECAST__MODEL__ONNX_THREADS");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.unwrap().model.onnx_threads, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load_from_path("/nonexistent/config.toml").is_err());
    }
}
