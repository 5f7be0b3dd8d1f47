//! Query commands that print recommendation tables.

use super::config::Config;
use crate::api::{Recommender, RecommenderConfig};
use crate::error::Result;
use std::time::Instant;

fn print_header(title: &str) {
    println!("\n===================================================================");
    println!("  {}", title);
    println!("===================================================================\n");
}

fn load_recommender(config: Config) -> Result<Recommender> {
    println!("Loading models...");
    let start = Instant::now();
    let recommender = Recommender::with_config(RecommenderConfig::new().with_config(config))?;
    let info = recommender.model_info();
    println!(
        "  ✓ Content model: {} products, {} features",
        info.content_products, info.tfidf_features
    );
    println!(
        "  ✓ Collaborative model: {} users, {} products",
        info.cf_users, info.cf_products
    );
    println!(
        "  ✓ Catalog: {} products ({:.2}s)\n",
        info.catalog_products,
        start.elapsed().as_secs_f64()
    );
    Ok(recommender)
}

/// Keyword search over the content model.
pub fn search(config: Config, keyword: &str, top_k: usize) -> Result<()> {
    print_header("Keyword Search");
    let recommender = load_recommender(config)?;

    println!("Query: {}\n", keyword);
    println!("{}", recommender.recommend_by_keyword(keyword, top_k));
    Ok(())
}

/// Products similar to a known product.
pub fn similar(config: Config, product_id: &str, top_k: usize) -> Result<()> {
    print_header("Similar Products");
    let recommender = load_recommender(config)?;

    println!("Product: {}\n", product_id);
    println!("{}", recommender.recommend_by_product_id(product_id, top_k)?);
    Ok(())
}

/// A user's rating history followed by their recommendations.
pub fn for_user(config: Config, user_id: &str, top_k: usize) -> Result<()> {
    print_header("Recommendations for User");
    let recommender = load_recommender(config)?;

    match recommender.user_name(user_id) {
        Some(name) => println!("User: {} ({})\n", user_id, name),
        None => println!("User: {} (not in the ratings table)\n", user_id),
    }

    println!("Already rated:");
    println!("{}", recommender.rated_products(user_id));

    let recs = recommender.recommend_for_user(user_id, top_k);
    println!("Recommended:");
    println!("{}", recs.table);
    if !recs.is_complete() {
        println!("  ({} candidates skipped: prediction failed)\n", recs.skipped.len());
    }
    Ok(())
}

/// List the user directory.
pub fn list_users(config: Config) -> Result<()> {
    print_header("Users");
    let recommender = load_recommender(config)?;

    let users = recommender.users();
    for (id, name) in &users {
        println!("  {:>8}  {}", id, name);
    }
    println!("\n{} users", users.len());
    Ok(())
}
