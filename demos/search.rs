/// Query a trained recommender from a program.
///
/// Build the models first, then run:
/// ```
/// cargo run --release -- build-content --light
/// cargo run --release -- build-collab
/// cargo run --example search
/// ```
use shoprec::api::Recommender;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Shoprec - Search Example\n");

    println!("Loading models...");
    let recommender = Recommender::new()?;

    let info = recommender.model_info();
    println!(
        "✓ {} products indexed over {} terms, {} users in the rating model\n",
        info.content_products, info.tfidf_features, info.cf_users
    );

    let keywords = ["áo thun", "quần jean", "giày thể thao"];

    println!("{}", "=".repeat(70));
    for keyword in keywords {
        let results = recommender.recommend_by_keyword(keyword, 5);
        println!("\nKeyword: \"{}\" ({} matches)", keyword, results.len());
        for row in &results.rows {
            println!("  {:>8}  {:.3}  {}", row.product_id, row.score, row.name);
        }

        if let Some(top) = results.rows.first() {
            let similar = recommender.recommend_by_product_id(&top.product_id, 3)?;
            println!("Similar to {}:", top.product_id);
            for row in &similar.rows {
                println!("  {:>8}  {:.3}  {}", row.product_id, row.score, row.name);
            }
        }
        println!("{}", "-".repeat(70));
    }

    if let Some((user_id, name)) = recommender.users().into_iter().next() {
        let recs = recommender.recommend_for_user(user_id, 5);
        println!("\nFor user {} ({}):", user_id, name);
        println!("{}", recs.table);
    }

    println!("\n✓ Done!");

    Ok(())
}
