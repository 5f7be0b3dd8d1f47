//! High-level API for product recommendations
//!
//! This module loads every snapshot and table a serving session needs and
//! exposes the three query modes behind one immutable [`Recommender`].
//!
//! # Quick Start
//!
//! ```no_run
//! use shoprec::api::Recommender;
//!
//! let recommender = Recommender::new()?;
//! let results = recommender.recommend_by_keyword("quần jean", 10);
//! println!("{}", results);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Concurrency
//!
//! Queries take `&self` and never mutate the loaded models, so a single
//! recommender can be shared across threads (e.g. behind an `Arc`).

use crate::engine::collaborative::{
    rated_by, recommend_for_user, CollaborativeSnapshot, UserRecommendations,
};
use crate::engine::content::ContentSnapshot;
use crate::engine::data::{Product, RatingRecord};
use crate::engine::policy::ProductPolicy;
use crate::engine::results::{ResultRow, ResultTable, ScoreKind};
use crate::engine::save::{load_collaborative, load_content};
use crate::error::Result;
use crate::model_loader::ensure_model_files;
use crate::{load_products, load_ratings};
use std::collections::BTreeMap;
use tracing::info;

pub use crate::model_loader::RecommenderConfig;

/// Main entry point for serving recommendations
pub struct Recommender {
    content: ContentSnapshot,
    collaborative: CollaborativeSnapshot,
    catalog: Vec<Product>,
    ratings: Vec<RatingRecord>,
    policy: Box<dyn ProductPolicy>,
}

/// Sizes of the loaded models
#[derive(Debug)]
pub struct ModelInfo {
    pub content_products: usize,
    pub tfidf_features: usize,
    pub catalog_products: usize,
    pub cf_users: usize,
    pub cf_products: usize,
}

impl Recommender {
    /// Create a recommender with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A model snapshot is missing from `models/`
    /// - A snapshot is corrupted
    /// - The product or rating table cannot be read
    pub fn new() -> Result<Self> {
        Self::with_config(RecommenderConfig::default())
    }

    /// Create a recommender with custom configuration
    pub fn with_config(config: RecommenderConfig) -> Result<Self> {
        let files = config.get_model_files();
        ensure_model_files(&files)?;

        let content = load_content(&files.content)?;
        let collaborative = load_collaborative(&files.collaborative)?;

        let settings = &config.config;
        let catalog = load_products(
            &settings.data.products_csv,
            settings.content.suspect_keywords.as_slice(),
        )?;
        let ratings = load_ratings(&settings.data.ratings_csv, settings.data.ratings_delimiter)?;
        info!(
            catalog = catalog.len(),
            ratings = ratings.len(),
            "loaded serving tables"
        );

        Ok(Self::from_parts(
            content,
            collaborative,
            catalog,
            ratings,
            config.policy,
        ))
    }

    /// Assemble a recommender from already loaded parts.
    pub fn from_parts(
        content: ContentSnapshot,
        collaborative: CollaborativeSnapshot,
        catalog: Vec<Product>,
        ratings: Vec<RatingRecord>,
        policy: Box<dyn ProductPolicy>,
    ) -> Self {
        Self {
            content,
            collaborative,
            catalog,
            ratings,
            policy,
        }
    }

    /// Products whose text matches `keyword`, scored by cosine similarity.
    pub fn recommend_by_keyword(&self, keyword: &str, top_k: usize) -> ResultTable {
        self.content
            .recommend_by_keyword(keyword, top_k, self.policy.as_ref())
    }

    /// Products similar to `product_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RecommendError::UnknownProduct`] if the product is not in the content model.
    pub fn recommend_by_product_id(&self, product_id: &str, top_k: usize) -> Result<ResultTable> {
        self.content
            .recommend_by_product_id(product_id, top_k, self.policy.as_ref())
    }

    /// Unrated products ranked by predicted rating; unknown users get fallback estimates.
    pub fn recommend_for_user(&self, user_id: &str, top_k: usize) -> UserRecommendations {
        recommend_for_user(
            user_id,
            top_k,
            &self.catalog,
            &self.ratings,
            &self.collaborative.model,
        )
    }

    /// Catalog rows the user has rated, in catalog order.
    pub fn rated_products(&self, user_id: &str) -> ResultTable {
        let rated = rated_by(&self.ratings, user_id);
        ResultTable {
            kind: ScoreKind::Unscored,
            rows: self
                .catalog
                .iter()
                .filter(|p| rated.contains(p.product_id.as_str()))
                .map(|p| ResultRow::from_product(p, 0.0))
                .collect(),
        }
    }

    /// Display name of a user from the ratings table.
    pub fn user_name(&self, user_id: &str) -> Option<&str> {
        self.ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .and_then(|r| r.user_name.as_deref())
    }

    /// Every user id with its display name, sorted by id.
    pub fn users(&self) -> BTreeMap<&str, &str> {
        let mut users = BTreeMap::new();
        for r in &self.ratings {
            users
                .entry(r.user_id.as_str())
                .or_insert_with(|| r.user_name.as_deref().unwrap_or(""));
        }
        users
    }

    /// Get information about the loaded models
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            content_products: self.content.len(),
            tfidf_features: self.content.vectorizer().n_features(),
            catalog_products: self.catalog.len(),
            cf_users: self.collaborative.model.n_users(),
            cf_products: self.collaborative.model.n_items(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::fixtures::{product, rating};
    use crate::engine::policy::FlaggedPolicy;
    use crate::engine::svd::SvdParams;
    use crate::RecommendError;
    use std::sync::Arc;

    fn recommender() -> Recommender {
        let mut catalog = vec![
            product("A", "red cotton shirt"),
            product("B", "blue cotton shirt"),
            product("C", "leather shoe"),
            product("D", "pink cotton shirt"),
        ];
        catalog[3].possibly_female = true;
        let ratings = vec![
            rating("U1", "A", 5.0),
            rating("U1", "B", 4.0),
            rating("U2", "A", 4.0),
            rating("U2", "B", 3.0),
            rating("U2", "C", 2.0),
        ];
        let content = ContentSnapshot::build(catalog.clone(), None).unwrap();
        let params = SvdParams {
            n_factors: 2,
            n_epochs: 10,
            ..SvdParams::default()
        };
        let collaborative = CollaborativeSnapshot::train(&ratings, 3, &params).unwrap();
        Recommender::from_parts(content, collaborative, catalog, ratings, Box::new(FlaggedPolicy))
    }

    #[test]
    fn test_keyword_query_applies_policy() {
        let table = recommender().recommend_by_keyword("cotton shirt", 10);
        assert_eq!(table.kind, ScoreKind::Similarity);
        assert!(!table.product_ids().contains(&"D"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_product_surfaces_lookup_error() {
        let err = recommender().recommend_by_product_id("Z", 5).unwrap_err();
        assert!(matches!(err, RecommendError::UnknownProduct(_)));
    }

    #[test]
    fn test_user_scenario_excludes_rated() {
        let recs = recommender().recommend_for_user("U1", 10);
        let ids = recs.table.product_ids();
        assert!(!ids.contains(&"A") && !ids.contains(&"B"));
        assert_eq!(recs.table.kind, ScoreKind::PredictedRating);
    }

    #[test]
    fn test_user_directory_and_history() {
        let rec = recommender();
        assert_eq!(rec.user_name("U2"), Some("name-U2"));
        assert_eq!(rec.user_name("nobody"), None);
        assert_eq!(rec.users().keys().copied().collect::<Vec<_>>(), vec!["U1", "U2"]);
        assert_eq!(rec.rated_products("U1").product_ids(), vec!["A", "B"]);
    }

    #[test]
    fn test_shared_across_threads() {
        let rec = Arc::new(recommender());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rec = Arc::clone(&rec);
                std::thread::spawn(move || rec.recommend_by_keyword("leather", 3).len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }

    #[test]
    fn test_missing_models_fail_on_creation() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RecommenderConfig::new().with_model_dir(dir.path().to_string_lossy());
        assert!(matches!(
            Recommender::with_config(config),
            Err(RecommendError::MissingArtifact { .. })
        ));
    }
}
