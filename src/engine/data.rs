//! Data structures for catalog and rating records.

use super::preprocess::{is_suspect, normalize};
use serde::{Deserialize, Serialize};

/// A row of the cleaned product table.
#[derive(Debug, Deserialize, Clone)]
pub struct ProductRecord {
    /// Unique product identifier (kept as an opaque string)
    pub product_id: String,
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Description after the upstream cleaning script, preferred for TF-IDF
    #[serde(default)]
    pub clean_description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A single explicit rating event.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RatingRecord {
    pub user_id: String,
    /// Display name of the user
    #[serde(rename = "user", default)]
    pub user_name: Option<String>,
    pub product_id: String,
    pub rating: f64,
}

/// A catalog product enriched with the fields derived during preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Normalized name + description, the document fed to TF-IDF
    pub combined_text: String,
    /// Flag set from the product name by the suspect-keyword classifier
    pub possibly_female: bool,
}

impl Product {
    /// Derive a product from a raw record.
    ///
    /// The policy flag looks at the name only, so long descriptions do not
    /// over-filter the catalog. Missing or non-finite price and rating become 0.
    pub fn from_record(record: ProductRecord, suspect_keywords: &[String]) -> Self {
        let name = record.product_name.unwrap_or_default();
        let text_source = record
            .clean_description
            .as_deref()
            .or(record.description.as_deref())
            .unwrap_or("");
        let combined_text = normalize(Some(&format!("{} {}", name, text_source)));
        let possibly_female = is_suspect(&name, suspect_keywords);

        Product {
            product_id: record.product_id,
            category: record
                .sub_category
                .or(record.category)
                .unwrap_or_default(),
            price: record.price.filter(|v| v.is_finite()).unwrap_or(0.0),
            rating: record.rating.filter(|v| v.is_finite()).unwrap_or(0.0),
            description: record.description.filter(|d| !d.trim().is_empty()),
            image: record.image,
            combined_text,
            possibly_female,
            name,
        }
    }

    /// Whether the product passes the catalog business rules.
    pub fn is_listable(&self) -> bool {
        self.price > 0.0 && self.description.is_some()
    }
}
