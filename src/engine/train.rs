//! Offline model-building pipelines.

use super::collaborative::CollaborativeSnapshot;
use super::config::Config;
use super::content::{BuildVariant, ContentSnapshot};
use super::save::{save_collaborative_model, save_content_model};
use crate::error::Result;
use crate::{load_products, load_ratings};
use std::time::Instant;

fn print_header(title: &str) {
    println!("\n===================================================================");
    println!("  {}", title);
    println!("===================================================================\n");
}

/// Build the content model and save it.
///
/// This function orchestrates the content pipeline:
/// 1. Load and preprocess the product table
/// 2. Select the product subset for the requested variant
/// 3. Fit TF-IDF and compute the similarity matrix
/// 4. Save the snapshot
pub fn build_content_model(config: &Config, variant: BuildVariant) -> Result<ContentSnapshot> {
    print_header("Content-Based Model Build");

    println!("Loading products...");
    let start = Instant::now();
    let products = load_products(
        &config.data.products_csv,
        config.content.suspect_keywords.as_slice(),
    )?;
    let flagged = products.iter().filter(|p| p.possibly_female).count();
    println!(
        "  Loaded {} products | {} flagged by policy ({:.2}s)\n",
        products.len(),
        flagged,
        start.elapsed().as_secs_f64()
    );

    let selected = variant.select(products);
    match variant {
        BuildVariant::Full => println!("Variant: full ({} products)", selected.len()),
        BuildVariant::Light { max_products, .. } => println!(
            "Variant: light ({} products, cap {})",
            selected.len(),
            max_products
        ),
    }

    println!("Vectorizing and computing cosine similarity...");
    let start = Instant::now();
    let snapshot = ContentSnapshot::build(selected, config.content.max_features)?;
    println!(
        "  {} features, {}×{} matrix ({:.2}s)",
        snapshot.vectorizer().n_features(),
        snapshot.len(),
        snapshot.len(),
        start.elapsed().as_secs_f64()
    );

    save_content_model(&snapshot, &config.output)?;
    Ok(snapshot)
}

/// Train the collaborative model on active users and save it.
pub fn build_collaborative_model(config: &Config) -> Result<CollaborativeSnapshot> {
    print_header("Collaborative Filtering Model Build");

    println!("Loading ratings...");
    let ratings = load_ratings(&config.data.ratings_csv, config.data.ratings_delimiter)?;
    println!("  Loaded {} ratings\n", ratings.len());

    let cf = &config.collaborative;
    println!(
        "Training SVD ({} factors, {} epochs, min {} ratings per user)...",
        cf.n_factors, cf.n_epochs, cf.min_user_ratings
    );
    let start = Instant::now();
    let snapshot = CollaborativeSnapshot::train(&ratings, cf.min_user_ratings, &cf.svd_params())?;
    println!(
        "  Trained on {} users and {} products ({:.2}s)",
        snapshot.model.n_users(),
        snapshot.model.n_items(),
        start.elapsed().as_secs_f64()
    );

    save_collaborative_model(&snapshot, &config.output)?;
    Ok(snapshot)
}
