//! Biased matrix factorization (SVD-style) trained with stochastic gradient descent.
//!
//! A rating is estimated as
//!
//! ```text
//! r̂(u, i) = μ + b_u + b_i + p_u · q_i
//! ```
//!
//! where the bias and factor terms of an unknown user or item are taken as zero,
//! so every pair gets a numeric estimate. Estimates are clipped to the rating scale.

use super::data::RatingRecord;
use crate::error::{PredictionError, RecommendError, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// SGD hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvdParams {
    pub n_factors: usize,
    pub n_epochs: usize,
    pub lr: f64,
    pub reg: f64,
    pub init_std: f64,
    pub seed: u64,
    pub rating_scale: (f64, f64),
}

impl Default for SvdParams {
    fn default() -> Self {
        SvdParams {
            n_factors: 100,
            n_epochs: 20,
            lr: 0.005,
            reg: 0.02,
            init_std: 0.1,
            seed: 42,
            rating_scale: (1.0, 5.0),
        }
    }
}

/// Outcome of scoring a single (user, product) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Estimated rating, clipped to the rating scale
    pub estimate: f64,
    pub user_known: bool,
    pub item_known: bool,
}

/// Trained latent-factor model keyed by string identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvdModel {
    params: SvdParams,
    global_mean: f64,
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    user_bias: Array1<f64>,
    item_bias: Array1<f64>,
    user_factors: Array2<f64>,
    item_factors: Array2<f64>,
}

impl SvdModel {
    /// Fit the model on observed ratings.
    ///
    /// # Errors
    ///
    /// Fails with [`RecommendError::NoTrainingData`] when `ratings` is empty,
    /// [`RecommendError::InvalidConfig`] when `init_std` is not a valid standard
    /// deviation, and [`RecommendError::TrainingDiverged`] when SGD drives any
    /// parameter to NaN or infinity.
    pub fn fit(ratings: &[RatingRecord], params: &SvdParams) -> Result<Self> {
        if ratings.is_empty() {
            return Err(RecommendError::NoTrainingData { min_ratings: 0 });
        }

        let mut user_index: HashMap<String, usize> = HashMap::new();
        let mut item_index: HashMap<String, usize> = HashMap::new();
        let mut triples: Vec<(usize, usize, f64)> = Vec::with_capacity(ratings.len());
        for r in ratings {
            let next_user = user_index.len();
            let u = *user_index.entry(r.user_id.clone()).or_insert(next_user);
            let next_item = item_index.len();
            let i = *item_index.entry(r.product_id.clone()).or_insert(next_item);
            triples.push((u, i, r.rating));
        }

        let k = params.n_factors;
        let normal = Normal::new(0.0, params.init_std).map_err(|e| {
            RecommendError::InvalidConfig(format!("init_std {}: {}", params.init_std, e))
        })?;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let user_factors =
            Array2::from_shape_fn((user_index.len(), k), |_| normal.sample(&mut rng));
        let item_factors =
            Array2::from_shape_fn((item_index.len(), k), |_| normal.sample(&mut rng));

        let mut model = SvdModel {
            params: params.clone(),
            global_mean: triples.iter().map(|t| t.2).sum::<f64>() / triples.len() as f64,
            user_bias: Array1::zeros(user_index.len()),
            item_bias: Array1::zeros(item_index.len()),
            user_index,
            item_index,
            user_factors,
            item_factors,
        };

        info!(
            users = model.n_users(),
            items = model.n_items(),
            ratings = triples.len(),
            factors = k,
            "training SVD model"
        );

        for epoch in 0..params.n_epochs {
            triples.shuffle(&mut rng);
            let mut squared_error = 0.0;
            for &(u, i, rating) in &triples {
                squared_error += model.sgd_step(u, i, rating);
            }
            debug!(
                epoch = epoch + 1,
                rmse = (squared_error / triples.len() as f64).sqrt(),
                "SGD epoch finished"
            );
            if !squared_error.is_finite() || !model.parameters_finite() {
                warn!(epoch = epoch + 1, lr = params.lr, "SGD diverged");
                return Err(RecommendError::TrainingDiverged { epoch: epoch + 1 });
            }
        }

        Ok(model)
    }

    fn parameters_finite(&self) -> bool {
        self.user_bias.iter().all(|v| v.is_finite())
            && self.item_bias.iter().all(|v| v.is_finite())
            && self.user_factors.iter().all(|v| v.is_finite())
            && self.item_factors.iter().all(|v| v.is_finite())
    }

    /// One SGD update; returns the squared error before the update.
    fn sgd_step(&mut self, u: usize, i: usize, rating: f64) -> f64 {
        let (lr, reg) = (self.params.lr, self.params.reg);
        let dot: f64 = self.user_factors.row(u).dot(&self.item_factors.row(i));
        let err = rating - (self.global_mean + self.user_bias[u] + self.item_bias[i] + dot);

        self.user_bias[u] += lr * (err - reg * self.user_bias[u]);
        self.item_bias[i] += lr * (err - reg * self.item_bias[i]);

        for f in 0..self.params.n_factors {
            let puf = self.user_factors[[u, f]];
            let qif = self.item_factors[[i, f]];
            self.user_factors[[u, f]] += lr * (err * qif - reg * puf);
            self.item_factors[[i, f]] += lr * (err * puf - reg * qif);
        }

        err * err
    }

    /// Score a pair, reporting a non-finite estimate as an error.
    pub fn try_predict(
        &self,
        user_id: impl ToString,
        product_id: impl ToString,
    ) -> std::result::Result<Prediction, PredictionError> {
        let user = user_id.to_string();
        let product = product_id.to_string();
        let u = self.user_index.get(&user).copied();
        let i = self.item_index.get(&product).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = u {
            estimate += self.user_bias[u];
        }
        if let Some(i) = i {
            estimate += self.item_bias[i];
        }
        if let (Some(u), Some(i)) = (u, i) {
            estimate += self.user_factors.row(u).dot(&self.item_factors.row(i));
        }

        if !estimate.is_finite() {
            return Err(PredictionError::NonFinite { user, product });
        }

        let (low, high) = self.params.rating_scale;
        Ok(Prediction {
            estimate: estimate.clamp(low, high),
            user_known: u.is_some(),
            item_known: i.is_some(),
        })
    }

    /// Estimated rating, falling back to the global mean when scoring fails.
    pub fn predict(&self, user_id: impl ToString, product_id: impl ToString) -> f64 {
        let (low, high) = self.params.rating_scale;
        self.try_predict(user_id, product_id)
            .map(|p| p.estimate)
            .unwrap_or_else(|_| self.global_mean.clamp(low, high))
    }

    pub fn knows_user(&self, user_id: impl ToString) -> bool {
        self.user_index.contains_key(&user_id.to_string())
    }

    pub fn knows_item(&self, product_id: impl ToString) -> bool {
        self.item_index.contains_key(&product_id.to_string())
    }

    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_index.len()
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn params(&self) -> &SvdParams {
        &self.params
    }

    #[cfg(test)]
    pub(crate) fn with_item_bias(mut self, product_id: &str, value: f64) -> Self {
        if let Some(&i) = self.item_index.get(product_id) {
            self.item_bias[i] = value;
        }
        self
    }
}
