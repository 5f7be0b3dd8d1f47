//! User-based recommendations from the collaborative model.

use super::data::{Product, RatingRecord};
use super::results::{ResultRow, ResultTable, ScoreKind};
use super::svd::{SvdModel, SvdParams};
use crate::error::{PredictionError, RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Keep only the ratings of users with at least `min_ratings` ratings.
///
/// Users below the threshold are dropped entirely.
pub fn filter_active_users(ratings: &[RatingRecord], min_ratings: usize) -> Vec<RatingRecord> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in ratings {
        *counts.entry(r.user_id.as_str()).or_insert(0) += 1;
    }
    ratings
        .iter()
        .filter(|r| counts[r.user_id.as_str()] >= min_ratings)
        .cloned()
        .collect()
}

/// Trained collaborative model plus the settings it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeSnapshot {
    pub model: SvdModel,
    /// Activity threshold applied before training
    pub min_user_ratings: usize,
}

impl CollaborativeSnapshot {
    /// Drop inactive users and train the latent-factor model.
    ///
    /// # Errors
    ///
    /// Fails when no user reaches `min_user_ratings`.
    pub fn train(
        ratings: &[RatingRecord],
        min_user_ratings: usize,
        params: &SvdParams,
    ) -> Result<Self> {
        let active = filter_active_users(ratings, min_user_ratings);
        info!(
            total = ratings.len(),
            kept = active.len(),
            min_user_ratings,
            "filtered ratings to active users"
        );
        if active.is_empty() {
            return Err(RecommendError::NoTrainingData {
                min_ratings: min_user_ratings,
            });
        }
        Ok(CollaborativeSnapshot {
            model: SvdModel::fit(&active, params)?,
            min_user_ratings,
        })
    }
}

/// A candidate whose prediction failed and was left out of the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
    pub product_id: String,
    pub error: PredictionError,
}

/// Recommendations for a user along with the candidates that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecommendations {
    pub table: ResultTable,
    pub skipped: Vec<SkippedCandidate>,
}

impl UserRecommendations {
    /// Whether every candidate was scored.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Product identifiers a user has rated in the full rating table.
pub fn rated_by<'a>(ratings: &'a [RatingRecord], user_id: &str) -> HashSet<&'a str> {
    ratings
        .iter()
        .filter(|r| r.user_id == user_id)
        .map(|r| r.product_id.as_str())
        .collect()
}

/// Rank unrated catalog products for a user by predicted rating.
///
/// Candidates are the catalog (first row per identifier) minus the products the
/// user rated. Each candidate is scored independently; failures are returned in
/// `skipped` instead of aborting the request. After taking the `top_k` best
/// estimates, products without a positive price or a description are dropped.
pub fn recommend_for_user(
    user_id: &str,
    top_k: usize,
    catalog: &[Product],
    ratings: &[RatingRecord],
    model: &SvdModel,
) -> UserRecommendations {
    let rated = rated_by(ratings, user_id);
    let mut seen: HashSet<&str> = HashSet::new();

    let mut scored: Vec<(&Product, f64)> = Vec::new();
    let mut skipped = Vec::new();
    for product in catalog {
        let id = product.product_id.as_str();
        if rated.contains(id) || !seen.insert(id) {
            continue;
        }
        match model.try_predict(user_id, id) {
            Ok(prediction) => scored.push((product, prediction.estimate)),
            Err(error) => skipped.push(SkippedCandidate {
                product_id: id.to_string(),
                error,
            }),
        }
    }

    if !skipped.is_empty() {
        warn!(
            user_id,
            skipped = skipped.len(),
            scored = scored.len(),
            "some candidates could not be scored"
        );
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let rows = scored
        .into_iter()
        .take(top_k)
        .filter(|(product, _)| product.is_listable())
        .map(|(product, score)| ResultRow::from_product(product, score))
        .collect();

    UserRecommendations {
        table: ResultTable {
            kind: ScoreKind::PredictedRating,
            rows,
        },
        skipped,
    }
}
