//! Configuration structures for the recommendation engine.
//!
//! This module provides strongly-typed configuration management using TOML files.
//! The configuration covers input tables, content model building, collaborative
//! model training hyperparameters, and output paths.

use super::preprocess::DEFAULT_SUSPECT_KEYWORDS;
use super::svd::SvdParams;
use crate::error::{RecommendError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Input table configuration
    pub data: DataConfig,
    /// Content model building configuration
    pub content: ContentConfig,
    /// Collaborative model training configuration
    pub collaborative: CollaborativeConfig,
    /// Output paths configuration
    pub output: OutputConfig,
}

/// Input table configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the cleaned product CSV
    pub products_csv: String,
    /// Path to the cleaned ratings CSV
    pub ratings_csv: String,
    /// Field delimiter of the ratings CSV
    pub ratings_delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            products_csv: "data/products_clean.csv".to_string(),
            ratings_csv: "data/ratings_clean.csv".to_string(),
            ratings_delimiter: '\t',
        }
    }
}

/// Content model building configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Product cap for the light build variant
    pub max_products: usize,
    /// Seed for the light build sample
    pub seed: u64,
    /// Optional vocabulary cap (most frequent terms kept)
    pub max_features: Option<usize>,
    /// Keywords marking a product as excluded by the default policy
    pub suspect_keywords: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            max_products: 1000,
            seed: 42,
            max_features: None,
            suspect_keywords: DEFAULT_SUSPECT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Collaborative model training configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollaborativeConfig {
    /// Number of latent factors
    pub n_factors: usize,
    /// Number of SGD passes over the ratings
    pub n_epochs: usize,
    /// SGD learning rate
    pub lr: f64,
    /// L2 regularization term
    pub reg: f64,
    /// Standard deviation of the initial factor values
    pub init_std: f64,
    /// Seed for factor initialization and shuffling
    pub seed: u64,
    /// Lower bound of the rating scale
    pub rating_min: f64,
    /// Upper bound of the rating scale
    pub rating_max: f64,
    /// Users with fewer ratings are dropped before training
    pub min_user_ratings: usize,
    /// Holdout ratio used by `evaluate` (e.g., 0.2 = 20% test)
    pub test_split: f64,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        CollaborativeConfig {
            n_factors: 100,
            n_epochs: 20,
            lr: 0.005,
            reg: 0.02,
            init_std: 0.1,
            seed: 42,
            rating_min: 1.0,
            rating_max: 5.0,
            min_user_ratings: 3,
            test_split: 0.2,
        }
    }
}

impl CollaborativeConfig {
    /// SGD hyperparameters derived from this section.
    pub fn svd_params(&self) -> SvdParams {
        SvdParams {
            n_factors: self.n_factors,
            n_epochs: self.n_epochs,
            lr: self.lr,
            reg: self.reg,
            init_std: self.init_std,
            seed: self.seed,
            rating_scale: (self.rating_min, self.rating_max),
        }
    }
}

/// Output paths configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory to save model files
    pub model_dir: String,
    /// Content snapshot filename
    pub content_file: String,
    /// Collaborative snapshot filename
    pub collaborative_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            model_dir: "models".to_string(),
            content_file: "content_model.json".to_string(),
            collaborative_file: "collaborative_model.json".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn content_path(&self) -> PathBuf {
        Path::new(&self.model_dir).join(&self.content_file)
    }

    pub fn collaborative_path(&self) -> PathBuf {
        Path::new(&self.model_dir).join(&self.collaborative_file)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// Returns `Ok(Config)` if successful, or an error if the file cannot be read,
    /// parsed, or holds values outside their valid range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration, falling back to defaults when the file is unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Config::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "using default configuration");
            Config::default()
        })
    }

    fn validate(&self) -> Result<()> {
        let cf = &self.collaborative;
        if cf.rating_min >= cf.rating_max {
            return Err(RecommendError::InvalidConfig(format!(
                "rating scale ({}, {}) is empty",
                cf.rating_min, cf.rating_max
            )));
        }
        if !(0.0..1.0).contains(&cf.test_split) {
            return Err(RecommendError::InvalidConfig(format!(
                "test_split must be in [0, 1), got {}",
                cf.test_split
            )));
        }
        if self.content.max_products == 0 {
            return Err(RecommendError::InvalidConfig(
                "max_products must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collaborative]
            n_factors = 8

            [output]
            model_dir = "/tmp/shop-models"
            "#,
        )
        .unwrap();

        assert_eq!(config.collaborative.n_factors, 8);
        assert_eq!(config.collaborative.min_user_ratings, 3);
        assert_eq!(config.content.max_products, 1000);
        assert_eq!(config.data.ratings_delimiter, '\t');
        assert_eq!(
            config.output.content_path(),
            PathBuf::from("/tmp/shop-models/content_model.json")
        );
    }

    #[test]
    fn test_inverted_rating_scale_rejected() {
        let mut config = Config::default();
        config.collaborative.rating_min = 5.0;
        config.collaborative.rating_max = 1.0;
        assert!(matches!(
            config.validate(),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.output.model_dir, "models");
    }
}
