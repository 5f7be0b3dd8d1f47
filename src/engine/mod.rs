//! Product Recommendation Engine
//!
//! This module implements the two recommenders behind the crate:
//!
//! - **Content-based**: TF-IDF over each product's name and description, plus a
//!   precomputed cosine-similarity matrix
//! - **Collaborative**: Biased matrix factorization (SVD) trained with SGD on
//!   explicit ratings
//!
//! ## Architecture
//!
//! ### Offline builds
//!
//! - Products are normalized (lowercase, no URLs, punctuation or digits) and
//!   flagged when their name contains a suspect keyword
//! - The full variant keeps every product with text; the light variant keeps
//!   priced, unflagged products and samples at most `max_products` of them
//! - Users with fewer than `min_user_ratings` ratings are dropped before SVD training
//!
//! ### Serving
//!
//! - Snapshots are loaded once and never mutated
//! - Similarity queries over-fetch candidates, then apply the exclusion policy
//! - User queries score every unrated catalog product and keep the listable ones
//!
//! ## Usage
//!
//! ### Building
//!
//! ```bash
//! ./target/release/shoprec build-content --light
//! ./target/release/shoprec build-collab
//! ```
//!
//! ### Querying
//!
//! ```bash
//! ./target/release/shoprec similar 190 -k 5
//! ./target/release/shoprec user 199
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use shoprec::engine::config::Config;
//! use shoprec::engine::content::BuildVariant;
//! use shoprec::engine::train::build_content_model;
//!
//! let config = Config::load_or_default("config.toml");
//! build_content_model(&config, BuildVariant::Full)?;
//! # Ok::<(), shoprec::RecommendError>(())
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` file to override the defaults:
//!
//! ```toml
//! [data]
//! products_csv = "data/products_clean.csv"
//! ratings_csv = "data/ratings_clean.csv"
//! ratings_delimiter = "\t"
//!
//! [content]
//! max_products = 1000
//! seed = 42
//!
//! [collaborative]
//! n_factors = 100
//! n_epochs = 20
//! lr = 0.005
//! reg = 0.02
//! min_user_ratings = 3
//! test_split = 0.2
//!
//! [output]
//! model_dir = "models"
//! content_file = "content_model.json"
//! collaborative_file = "collaborative_model.json"
//! ```
//!
//! ## Module Structure
//!
//! - [`config`] - Configuration structures and loading
//! - [`data`] - Product and rating records
//! - [`preprocess`] - Text normalization and suspect-keyword flags
//! - [`stopwords`] - English stop-word list
//! - [`tfidf`] - TF-IDF vectorizer
//! - [`similarity`] - Sparse vectors, cosine matrix and ranking
//! - [`policy`] - Exclusion policies applied after ranking
//! - [`content`] - Content snapshot and similarity queries
//! - [`svd`] - Biased SVD model
//! - [`collaborative`] - Collaborative snapshot and user queries
//! - [`results`] - Result table schema
//! - [`train`] - Model build pipelines
//! - [`evaluate`] - Holdout RMSE/MAE
//! - [`save`] - Model persistence
//! - [`predict`] - Query commands
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod collaborative;
pub mod config;
pub mod content;
pub mod data;
pub mod evaluate;
pub mod policy;
pub mod predict;
pub mod preprocess;
pub mod results;
pub mod save;
pub mod similarity;
pub mod stopwords;
pub mod svd;
pub mod tfidf;
pub mod train;

// Re-export commonly used items for external use
pub use cli::main_cli;
