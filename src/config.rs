//! Configuration management for the wallet scoring pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transaction batch location
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON file holding the list of transaction objects
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("user-wallet-transactions.json"),
        }
    }
}

/// Score file destination
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub scores_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            scores_path: PathBuf::from("wallet_scores.csv"),
        }
    }
}

/// Isolation forest settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Subsample size per tree, capped at the number of wallets
    pub max_samples: usize,
    /// Share of wallets assumed to be outliers
    pub contamination: f64,
    /// Seed for subsampling and split selection
    pub seed: u64,
    /// Fewest wallets the model will fit on
    pub min_samples: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            seed: 42,
            min_samples: 1,
        }
    }
}

/// Credit score range
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_score: u32,
    pub max_score: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 300,
            max_score: 1000,
        }
    }
}

/// Score distribution report
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Render the chart at all
    pub enabled: bool,
    /// Chart destination; `.svg` selects the SVG backend, anything else PNG
    pub chart_path: PathBuf,
    pub bucket_width: u32,
    /// Upper edge of the last bucket; scores at or above it land in the last bucket
    pub upper_edge: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chart_path: PathBuf::from("score_distribution.png"),
            bucket_width: 100,
            upper_edge: 1000,
            width: 1000,
            height: 600,
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
    /// Load configuration from the default path, falling back to built-in
    /// defaults when that file does not exist
    pub fn load() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_path(DEFAULT_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pipeline run could succeed with
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.scoring.min_score < self.scoring.max_score,
            "scoring.min_score ({}) must be below scoring.max_score ({})",
            self.scoring.min_score,
            self.scoring.max_score
        );
        anyhow::ensure!(
            self.model.contamination > 0.0 && self.model.contamination <= 0.5,
            "model.contamination must be in (0, 0.5], got {}",
            self.model.contamination
        );
        anyhow::ensure!(self.model.n_estimators > 0, "model.n_estimators must be positive");
        anyhow::ensure!(self.model.max_samples > 0, "model.max_samples must be positive");
        anyhow::ensure!(self.report.bucket_width > 0, "report.bucket_width must be positive");
        anyhow::ensure!(
            self.report.upper_edge >= self.report.bucket_width,
            "report.upper_edge must cover at least one bucket"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.input.path, PathBuf::from("user-wallet-transactions.json"));
        assert_eq!(config.output.scores_path, PathBuf::from("wallet_scores.csv"));
        assert_eq!(config.model.contamination, 0.05);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.scoring.min_score, 300);
        assert_eq!(config.scoring.max_score, 1000);
        assert_eq!(config.report.chart_path, PathBuf::from("score_distribution.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[model]\nseed = 7\n\n[input]\npath = \"batch.json\"").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.seed, 7);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.input.path, PathBuf::from("batch.json"));
        assert_eq!(config.output.scores_path, PathBuf::from("wallet_scores.csv"));
    }

    #[test]
    fn test_invalid_score_range() {
        let mut config = AppConfig::default();
        config.scoring.min_score = 1000;
        config.scoring.max_score = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from_path(dir.path().join("nope.toml")).is_err());
    }
}
