//! Result schema shared by every recommendation query.

use super::data::Product;
use serde::Serialize;
use std::fmt;

/// Maximum number of characters kept in `short_description`.
pub const SHORT_DESCRIPTION_CHARS: usize = 200;

/// What the `score` column of a result table means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Cosine similarity in [0, 1]
    Similarity,
    /// Rating estimated by the collaborative model
    PredictedRating,
    /// Plain listing without a score
    Unscored,
}

impl ScoreKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreKind::Similarity => "Similarity",
            ScoreKind::PredictedRating => "Predicted rating",
            ScoreKind::Unscored => "",
        }
    }
}

/// One recommended product in display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub short_description: String,
    pub image: Option<String>,
    pub score: f64,
}

impl ResultRow {
    pub fn from_product(product: &Product, score: f64) -> Self {
        ResultRow {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            rating: product.rating,
            short_description: truncate_chars(
                product.description.as_deref().unwrap_or(""),
                SHORT_DESCRIPTION_CHARS,
            ),
            image: product.image.clone(),
            score,
        }
    }
}

/// Ordered recommendation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub kind: ScoreKind,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn empty(kind: ScoreKind) -> Self {
        ResultTable {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn product_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.product_id.as_str()).collect()
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No matching products found.");
        }
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>2}. [{}] {}", rank + 1, row.product_id, row.name)?;
            writeln!(f, "    Category: {}", row.category)?;
            writeln!(f, "    Price: {:.0} | Rating: {:.1}", row.price, row.rating)?;
            if !row.short_description.is_empty() {
                let ellipsis = if row.short_description.chars().count() >= SHORT_DESCRIPTION_CHARS {
                    "..."
                } else {
                    ""
                };
                writeln!(f, "    {}{}", row.short_description, ellipsis)?;
            }
            match self.kind {
                ScoreKind::Similarity => writeln!(f, "    {}: {:.3}", self.kind.label(), row.score)?,
                ScoreKind::PredictedRating => {
                    writeln!(f, "    {}: {:.1}", self.kind.label(), row.score)?
                }
                ScoreKind::Unscored => {}
            }
        }
        Ok(())
    }
}

/// First `max` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::fixtures::product;

    #[test]
    fn test_short_description_is_truncated_by_chars() {
        let mut p = product("1", "shirt");
        p.description = Some("á".repeat(250));
        let row = ResultRow::from_product(&p, 0.5);
        assert_eq!(row.short_description.chars().count(), 200);
    }

    #[test]
    fn test_missing_description_is_empty() {
        let mut p = product("1", "shirt");
        p.description = None;
        assert_eq!(ResultRow::from_product(&p, 0.5).short_description, "");
    }

    #[test]
    fn test_display_labels_score_kind() {
        let table = ResultTable {
            kind: ScoreKind::PredictedRating,
            rows: vec![ResultRow::from_product(&product("9", "wool coat"), 4.25)],
        };
        let text = table.to_string();
        assert!(text.contains("Predicted rating: 4.2") || text.contains("Predicted rating: 4.3"));
        assert!(ResultTable::empty(ScoreKind::Similarity)
            .to_string()
            .contains("No matching"));
    }
}
