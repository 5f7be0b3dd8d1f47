//! Model file management for serving.
//!
//! Resolves where the content and collaborative snapshots live and checks that
//! they exist before anything is loaded, so a missing artifact stops the serving
//! session up front instead of failing on the first query.
//!
//! # Examples
//!
//! ```no_run
//! use shoprec::model_loader::{ensure_model_files, ModelFiles};
//!
//! let files = ModelFiles::new(None);
//! ensure_model_files(&files)?;
//! # Ok::<(), shoprec::RecommendError>(())
//! ```

use crate::engine::config::{Config, OutputConfig};
use crate::engine::policy::{FlaggedPolicy, ProductPolicy};
use crate::error::{RecommendError, Result};
use std::path::PathBuf;
use tracing::error;

/// Snapshot files needed to serve recommendations.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub content: PathBuf,
    pub collaborative: PathBuf,
}

impl ModelFiles {
    /// Default file names under `model_dir` (or the configured default directory).
    pub fn new(model_dir: Option<&str>) -> Self {
        let mut output = OutputConfig::default();
        if let Some(dir) = model_dir {
            output.model_dir = dir.to_string();
        }
        Self::from_output(&output)
    }

    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            content: output.content_path(),
            collaborative: output.collaborative_path(),
        }
    }

    /// Paths of the artifacts that are not on disk.
    pub fn missing(&self) -> Vec<PathBuf> {
        [&self.content, &self.collaborative]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect()
    }

    /// Check if all required files exist
    pub fn exists(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Fail with [`RecommendError::MissingArtifact`] unless every snapshot file exists.
///
/// All missing paths are logged; the first one is returned.
pub fn ensure_model_files(files: &ModelFiles) -> Result<()> {
    let missing = files.missing();
    for path in &missing {
        error!(path = %path.display(), "model artifact not found; run the build commands first");
    }
    match missing.into_iter().next() {
        Some(path) => Err(RecommendError::MissingArtifact { path }),
        None => Ok(()),
    }
}

/// Configuration for creating a [`crate::api::Recommender`].
pub struct RecommenderConfig {
    pub config: Config,
    pub policy: Box<dyn ProductPolicy>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            config: Config::default(),
            policy: Box::new(FlaggedPolicy),
        }
    }
}

impl RecommenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.output.model_dir = dir.into();
        self
    }

    pub fn with_policy(mut self, policy: impl ProductPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn get_model_files(&self) -> ModelFiles {
        ModelFiles::from_output(&self.config.output)
    }
}
