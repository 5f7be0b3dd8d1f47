//! # Shoprec - Product Recommendation Engine
//!
//! Content-based and collaborative recommendations for an e-commerce catalog,
//! built offline and served from immutable snapshots.
//!
//! ## Features
//!
//! - **Content-Based**: TF-IDF over product name + description, with a
//!   precomputed cosine-similarity matrix for "similar products" and keyword search
//! - **Collaborative**: Biased SVD trained with SGD on explicit 1–5 ratings
//! - **Policy Filters**: Swappable exclusion rules applied after ranking
//! - **Model Persistence**: Save once, query without retraining
//! - **Command-Line Interface**: Build, evaluate and query from the shell
//!
//! ## Quick Start
//!
//! ```no_run
//! use shoprec::api::Recommender;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let recommender = Recommender::new()?;
//!
//!     let results = recommender.recommend_by_keyword("áo thun", 10);
//!     for row in &results.rows {
//!         println!("{} ({:.3})", row.name, row.score);
//!     }
//!
//!     let similar = recommender.recommend_by_product_id("190", 10)?;
//!     println!("{}", similar);
//!
//!     let for_user = recommender.recommend_for_user("199", 10);
//!     println!("{}", for_user.table);
//!     Ok(())
//! }
//! ```
//!
//! ### Building Models
//!
//! ```bash
//! shoprec build-content --light
//! shoprec build-collab
//! shoprec evaluate
//! ```
//!
//! ### Custom Configuration
//!
//! ```no_run
//! # use shoprec::api::{Recommender, RecommenderConfig};
//! # use shoprec::engine::policy::KeywordPolicy;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RecommenderConfig::new()
//!     .with_model_dir("custom_models")
//!     .with_policy(KeywordPolicy::new(["croptop", "váy"]));
//!
//! let recommender = Recommender::with_config(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Missing model files fail when the recommender is created, never at the first
//! query. An unknown product identifier is a [`RecommendError::UnknownProduct`];
//! empty keyword matches are empty tables, not errors.
//!
//! ## License
//!
//! GNU General Public License v3.0 (GPLv3)

pub mod api;
pub mod engine;
pub mod error;
pub mod model_loader;

pub use engine::content::ContentSnapshot;
pub use engine::results::{ResultRow, ResultTable, ScoreKind};
pub use error::{RecommendError, Result};

use csv::ReaderBuilder;
use engine::data::{Product, ProductRecord, RatingRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::path::Path;
use tracing::warn;

/// Load the product table and derive the preprocessing fields.
///
/// # Example
/// ```no_run
/// use shoprec::load_products;
/// use shoprec::engine::preprocess::DEFAULT_SUSPECT_KEYWORDS;
///
/// let products = load_products("data/products_clean.csv", DEFAULT_SUSPECT_KEYWORDS)?;
/// println!("Loaded {} products", products.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_products<S: AsRef<str>>(
    path: impl AsRef<Path>,
    suspect_keywords: &[S],
) -> Result<Vec<Product>> {
    let keywords: Vec<String> = suspect_keywords
        .iter()
        .map(|k| k.as_ref().to_string())
        .collect();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut products = Vec::new();
    for result in reader.deserialize() {
        let record: ProductRecord = result?;
        products.push(Product::from_record(record, &keywords));
    }

    Ok(products)
}

/// Load the rating table. Rows whose rating is NaN or infinite are dropped.
///
/// # Arguments
/// * `path` - CSV file with `user_id`, `user`, `product_id` and `rating` columns
/// * `delimiter` - Field separator (the cleaned export is tab-separated)
pub fn load_ratings(path: impl AsRef<Path>, delimiter: char) -> Result<Vec<RatingRecord>> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        RecommendError::InvalidConfig(format!("delimiter {:?} is not a single byte", delimiter))
    })?;
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut ratings = Vec::new();
    for result in reader.deserialize() {
        let record: RatingRecord = result?;
        if !record.rating.is_finite() {
            warn!(
                user = %record.user_id,
                product = %record.product_id,
                "skipping non-finite rating"
            );
            continue;
        }
        ratings.push(record);
    }

    Ok(ratings)
}

/// Split records into train and test sets after a seeded shuffle.
///
/// # Arguments
/// * `records` - The dataset to split
/// * `train_ratio` - Ratio of training data (0.0 to 1.0)
/// * `seed` - Shuffle seed, so a split can be reproduced
pub fn split_data<T: Clone>(records: &[T], train_ratio: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut shuffled = records.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let train_size = (records.len() as f64 * train_ratio) as usize;
    let test_data = shuffled.split_off(train_size.min(shuffled.len()));

    (shuffled, test_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_products_tolerates_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.csv");
        fs::write(
            &path,
            "product_id,product_name,price,description\n\
             1,Áo sơ mi nam,150000,\n\
             2,Đầm dạ hội,0,Đầm đẹp\n",
        )
        .unwrap();

        let products = load_products(&path, &["đầm"]).unwrap();
        assert_eq!(products.len(), 2);
        assert!(products[0].description.is_none());
        assert!(products[1].possibly_female);
        assert_eq!(products[1].price, 0.0);
    }

    #[test]
    fn test_load_ratings_with_tabs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.csv");
        fs::write(&path, "user_id\tuser\tproduct_id\trating\n5\tkim\t190\t4\n").unwrap();

        let ratings = load_ratings(&path, '\t').unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].user_id, "5");
        assert_eq!(ratings[0].user_name.as_deref(), Some("kim"));
        assert_eq!(ratings[0].rating, 4.0);
    }

    #[test]
    fn test_non_finite_csv_values_survive_snapshot_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.csv");
        fs::write(
            &path,
            "product_id,product_name,price,rating,description\n\
             1,cotton shirt,NaN,NaN,soft cotton shirt\n\
             2,linen shirt,120000,inf,light linen shirt\n",
        )
        .unwrap();

        let products = load_products(&path, &[] as &[&str]).unwrap();
        assert!(products.iter().all(|p| p.price.is_finite() && p.rating.is_finite()));

        let snapshot = ContentSnapshot::build(products, None).unwrap();
        let model = dir.path().join("content.json");
        engine::save::save_content(&snapshot, &model).unwrap();
        let loaded = engine::save::load_content(&model).unwrap();
        assert_eq!(loaded.products(), snapshot.products());
    }

    #[test]
    fn test_non_finite_ratings_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.csv");
        fs::write(
            &path,
            "user_id\tuser\tproduct_id\trating\n5\tkim\t190\tNaN\n5\tkim\t191\t3\n",
        )
        .unwrap();

        let ratings = load_ratings(&path, '\t').unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].product_id, "191");
    }

    #[test]
    fn test_split_data_is_reproducible() {
        let data: Vec<u32> = (0..10).collect();
        let (train, test) = split_data(&data, 0.8, 7);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(split_data(&data, 0.8, 7), (train, test));
    }
}
