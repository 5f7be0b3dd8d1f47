//! Exclusion policies applied after ranking.
//!
//! Ranking code never knows which products a deployment hides; it asks a
//! [`ProductPolicy`] for every candidate instead.

use super::data::Product;
use super::preprocess::{is_suspect, DEFAULT_SUSPECT_KEYWORDS};

/// Decides whether a ranked product must be dropped from the output.
pub trait ProductPolicy: Send + Sync {
    fn excludes(&self, product: &Product) -> bool;
}

impl<F> ProductPolicy for F
where
    F: Fn(&Product) -> bool + Send + Sync,
{
    fn excludes(&self, product: &Product) -> bool {
        self(product)
    }
}

/// Drops products flagged `possibly_female` when the snapshot was built.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlaggedPolicy;

impl ProductPolicy for FlaggedPolicy {
    fn excludes(&self, product: &Product) -> bool {
        product.possibly_female
    }
}

/// Re-tests the product name against a keyword list at query time.
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    keywords: Vec<String>,
}

impl KeywordPolicy {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordPolicy {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        KeywordPolicy::new(DEFAULT_SUSPECT_KEYWORDS.iter().copied())
    }
}

impl ProductPolicy for KeywordPolicy {
    fn excludes(&self, product: &Product) -> bool {
        is_suspect(&product.name, &self.keywords)
    }
}

/// Keeps every product.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ProductPolicy for AllowAll {
    fn excludes(&self, _product: &Product) -> bool {
        false
    }
}
