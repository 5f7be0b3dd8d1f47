//! Offline accuracy of the collaborative model on held-out ratings.

use super::collaborative::CollaborativeSnapshot;
use super::config::Config;
use super::data::RatingRecord;
use crate::error::Result;
use crate::{load_ratings, split_data};
use std::time::Instant;

/// Error metrics on the held-out ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub train_size: usize,
    pub test_size: usize,
    pub rmse: f64,
    pub mae: f64,
}

/// Hold out part of the active users' ratings, train on the rest and measure the error.
pub fn evaluate_ratings(ratings: &[RatingRecord], config: &Config) -> Result<EvaluationReport> {
    let cf = &config.collaborative;
    let active = super::collaborative::filter_active_users(ratings, cf.min_user_ratings);
    let (train, test) = split_data(&active, 1.0 - cf.test_split, cf.seed);

    // Held-out ratings already passed the activity filter once.
    let snapshot = CollaborativeSnapshot::train(&train, 1, &cf.svd_params())?;

    let (mut squared, mut absolute) = (0.0, 0.0);
    for r in &test {
        let err = r.rating - snapshot.model.predict(&r.user_id, &r.product_id);
        squared += err * err;
        absolute += err.abs();
    }
    let n = test.len().max(1) as f64;

    Ok(EvaluationReport {
        train_size: train.len(),
        test_size: test.len(),
        rmse: (squared / n).sqrt(),
        mae: absolute / n,
    })
}

/// Evaluate using the ratings table named in the configuration.
pub fn evaluate_collaborative_model(config: &Config) -> Result<EvaluationReport> {
    println!("\n===================================================================");
    println!("  Collaborative Filtering Evaluation");
    println!("===================================================================\n");

    let start = Instant::now();
    let ratings = load_ratings(&config.data.ratings_csv, config.data.ratings_delimiter)?;
    let report = evaluate_ratings(&ratings, config)?;

    println!("Train: {} | Test: {}\n", report.train_size, report.test_size);
    println!("Test Set:");
    println!("  RMSE: {:.4}", report.rmse);
    println!("  MAE:  {:.4}", report.mae);
    println!("  Time: {:.2}s\n", start.elapsed().as_secs_f64());

    Ok(report)
}
