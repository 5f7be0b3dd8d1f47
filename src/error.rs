//! Error types for building and querying recommendation models.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the model-building pipelines and the query layer.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The product identifier is not part of the loaded content snapshot.
    #[error("product `{0}` does not exist in the content model")]
    UnknownProduct(String),

    /// A model artifact required for serving is absent.
    #[error("model artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// No documents were available to fit the vectorizer.
    #[error("cannot fit TF-IDF on an empty corpus")]
    EmptyCorpus,

    /// Every token in the corpus was filtered out.
    #[error("corpus produced an empty vocabulary (only stop words or short tokens)")]
    EmptyVocabulary,

    /// No rating survived the active-user filter.
    #[error("no ratings left for training after keeping users with at least {min_ratings} ratings")]
    NoTrainingData { min_ratings: usize },

    /// SGD produced NaN or infinite biases or factors.
    #[error("training diverged at epoch {epoch}: model parameters became non-finite")]
    TrainingDiverged { epoch: usize },

    /// A persisted snapshot violates its structural invariants.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure to score a single (user, product) pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("non-finite estimate for user `{user}` and product `{product}`")]
    NonFinite { user: String, product: String },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
