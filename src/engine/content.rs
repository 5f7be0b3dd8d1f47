//! Content-based recommendations over product text.
//!
//! A [`ContentSnapshot`] owns the product subset, the fitted vectorizer, the
//! corpus vectors and the similarity matrix together. Row `i` of the product
//! list is row/column `i` of the matrix; the fields are private and the only
//! ways to obtain a snapshot are [`ContentSnapshot::build`] and a validated
//! deserialization, so the two can never drift apart.

use super::data::Product;
use super::policy::ProductPolicy;
use super::preprocess::normalize;
use super::results::{ResultRow, ResultTable, ScoreKind};
use super::similarity::{rank_descending, SimilarityMatrix, SparseVector};
use super::tfidf::TfidfVectorizer;
use crate::error::{RecommendError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Candidates fetched per requested result before filtering.
pub const OVERFETCH_FACTOR: usize = 5;

/// How the product subset of a content build is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    /// Every product with a name and some usable text.
    Full,
    /// Eligible products only (priced, not flagged), sampled down to `max_products`.
    Light { max_products: usize, seed: u64 },
}

impl BuildVariant {
    /// Select the products entering the model, in the row order they will keep.
    pub fn select(&self, products: Vec<Product>) -> Vec<Product> {
        match *self {
            BuildVariant::Full => products
                .into_iter()
                .filter(|p| !p.name.trim().is_empty() && !p.combined_text.trim().is_empty())
                .collect(),
            BuildVariant::Light { max_products, seed } => {
                let eligible: Vec<Product> = products
                    .into_iter()
                    .filter(|p| {
                        !p.combined_text.trim().is_empty() && p.price > 0.0 && !p.possibly_female
                    })
                    .collect();
                if eligible.len() <= max_products {
                    return eligible;
                }
                let mut rng = StdRng::seed_from_u64(seed);
                let picked = rand::seq::index::sample(&mut rng, eligible.len(), max_products);
                let mut slots: Vec<Option<Product>> = eligible.into_iter().map(Some).collect();
                picked
                    .into_iter()
                    .filter_map(|idx| slots[idx].take())
                    .collect()
            }
        }
    }
}

/// Immutable content model: products, vectorizer and similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawContentSnapshot")]
pub struct ContentSnapshot {
    products: Vec<Product>,
    vectorizer: TfidfVectorizer,
    vectors: Vec<SparseVector>,
    similarity: SimilarityMatrix,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct RawContentSnapshot {
    products: Vec<Product>,
    vectorizer: TfidfVectorizer,
    vectors: Vec<SparseVector>,
    similarity: SimilarityMatrix,
}

impl TryFrom<RawContentSnapshot> for ContentSnapshot {
    type Error = RecommendError;

    fn try_from(raw: RawContentSnapshot) -> Result<Self> {
        let n = raw.products.len();
        if !raw.similarity.is_square() || raw.similarity.len() != n {
            return Err(RecommendError::CorruptSnapshot(format!(
                "similarity matrix does not match {} products",
                n
            )));
        }
        if raw.vectors.len() != n {
            return Err(RecommendError::CorruptSnapshot(format!(
                "{} corpus vectors for {} products",
                raw.vectors.len(),
                n
            )));
        }
        let n_features = raw.vectorizer.idf.len();
        if let Some((term, &idx)) = raw
            .vectorizer
            .vocabulary
            .iter()
            .find(|&(_, &idx)| idx >= n_features)
        {
            return Err(RecommendError::CorruptSnapshot(format!(
                "vocabulary term `{}` maps to column {} of {}",
                term, idx, n_features
            )));
        }
        if let Some(row) = raw.vectors.iter().position(|v| !v.fits_dimension(n_features)) {
            return Err(RecommendError::CorruptSnapshot(format!(
                "corpus vector {} does not fit {} features",
                row, n_features
            )));
        }
        Ok(ContentSnapshot::assemble(
            raw.products,
            raw.vectorizer,
            raw.vectors,
            raw.similarity,
        ))
    }
}

impl ContentSnapshot {
    /// Fit TF-IDF over the products' `combined_text` and compute the similarity matrix.
    ///
    /// Products are used in the given order; no filtering happens here.
    pub fn build(products: Vec<Product>, max_features: Option<usize>) -> Result<Self> {
        if products.is_empty() {
            return Err(RecommendError::EmptyCorpus);
        }

        let corpus: Vec<String> = products.iter().map(|p| p.combined_text.clone()).collect();
        let mut vectorizer = TfidfVectorizer::new(max_features);
        let vectors = vectorizer.fit_transform(&corpus)?;
        info!(
            products = products.len(),
            features = vectorizer.n_features(),
            "fitted TF-IDF vectorizer"
        );

        let similarity = SimilarityMatrix::from_vectors(&vectors);
        debug!(size = similarity.len(), "computed cosine similarity matrix");

        Ok(ContentSnapshot::assemble(products, vectorizer, vectors, similarity))
    }

    fn assemble(
        products: Vec<Product>,
        vectorizer: TfidfVectorizer,
        vectors: Vec<SparseVector>,
        similarity: SimilarityMatrix,
    ) -> Self {
        let mut positions = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            positions.entry(product.product_id.clone()).or_insert(idx);
        }
        ContentSnapshot {
            products,
            vectorizer,
            vectors,
            similarity,
            positions,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Row index of a product; the first row wins for duplicated identifiers.
    pub fn position(&self, product_id: &str) -> Option<usize> {
        self.positions.get(product_id).copied()
    }

    /// Products most similar to `product_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::UnknownProduct`] if the identifier is not in the snapshot.
    pub fn recommend_by_product_id(
        &self,
        product_id: &str,
        top_k: usize,
        policy: &dyn ProductPolicy,
    ) -> Result<ResultTable> {
        let index = self
            .position(product_id)
            .ok_or_else(|| RecommendError::UnknownProduct(product_id.to_string()))?;

        let ranked = rank_descending(self.similarity.row(index).enumerate());
        let candidates = ranked
            .into_iter()
            .filter(|(i, _)| *i != index && self.products[*i].product_id != product_id)
            .take(top_k.saturating_mul(OVERFETCH_FACTOR));

        Ok(self.collect(candidates, top_k, policy))
    }

    /// Products whose text best matches a free-text keyword.
    ///
    /// The keyword goes through the fitted vectorizer; an empty keyword or one
    /// made only of unknown terms yields an empty table.
    pub fn recommend_by_keyword(
        &self,
        keyword: &str,
        top_k: usize,
        policy: &dyn ProductPolicy,
    ) -> ResultTable {
        let query = self.vectorizer.transform(&normalize(Some(keyword)));
        if query.is_empty() {
            debug!(keyword, "keyword has no known terms");
            return ResultTable::empty(ScoreKind::Similarity);
        }

        let ranked = rank_descending(
            self.vectors
                .iter()
                .map(|doc| query.cosine(doc))
                .enumerate(),
        );
        let candidates = ranked
            .into_iter()
            .take(top_k.saturating_mul(OVERFETCH_FACTOR));

        self.collect(candidates, top_k, policy)
    }

    fn collect(
        &self,
        candidates: impl Iterator<Item = (usize, f64)>,
        top_k: usize,
        policy: &dyn ProductPolicy,
    ) -> ResultTable {
        let rows = candidates
            .filter(|(_, score)| *score > 0.0)
            .map(|(i, score)| (&self.products[i], score))
            .filter(|(product, _)| !policy.excludes(product))
            .take(top_k)
            .map(|(product, score)| ResultRow::from_product(product, score))
            .collect();

        ResultTable {
            kind: ScoreKind::Similarity,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::fixtures::product;
    use crate::engine::policy::{AllowAll, FlaggedPolicy};

    fn shirts() -> ContentSnapshot {
        ContentSnapshot::build(
            vec![
                product("A", "red cotton shirt"),
                product("B", "blue cotton shirt"),
                product("C", "leather shoe"),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_keyword_scenario_ranks_shirts_first() {
        let snapshot = shirts();
        let table = snapshot.recommend_by_keyword("cotton shirt", 2, &AllowAll);

        assert_eq!(table.kind, ScoreKind::Similarity);
        assert_eq!(table.len(), 2);
        let mut ids = table.product_ids();
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(table.rows.iter().all(|r| r.score > 0.0));
    }

    #[test]
    fn test_keyword_excludes_zero_scores() {
        let table = shirts().recommend_by_keyword("cotton shirt", 10, &AllowAll);
        assert_eq!(table.len(), 2);
        assert!(!table.product_ids().contains(&"C"));
    }

    #[test]
    fn test_empty_or_unknown_keyword_is_empty() {
        let snapshot = shirts();
        assert!(snapshot.recommend_by_keyword("", 5, &AllowAll).is_empty());
        assert!(snapshot.recommend_by_keyword("   ", 5, &AllowAll).is_empty());
        assert!(snapshot.recommend_by_keyword("wool", 5, &AllowAll).is_empty());
    }

    #[test]
    fn test_by_product_id_excludes_self() {
        let snapshot = shirts();
        let table = snapshot.recommend_by_product_id("A", 10, &AllowAll).unwrap();

        assert_eq!(table.product_ids(), vec!["B"]);
        assert!(table.rows[0].score > 0.0 && table.rows[0].score < 1.0);
    }

    #[test]
    fn test_identical_texts_do_not_leak_self() {
        let snapshot = ContentSnapshot::build(
            vec![product("X", "linen shirt"), product("Y", "linen shirt")],
            None,
        )
        .unwrap();
        let table = snapshot.recommend_by_product_id("Y", 5, &AllowAll).unwrap();
        assert_eq!(table.product_ids(), vec!["X"]);
        assert!((table.rows[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_product_is_lookup_error() {
        let err = shirts()
            .recommend_by_product_id("missing", 5, &AllowAll)
            .unwrap_err();
        assert!(matches!(err, RecommendError::UnknownProduct(id) if id == "missing"));
    }

    #[test]
    fn test_policy_filter_applies() {
        let mut flagged = product("B", "blue cotton shirt");
        flagged.possibly_female = true;
        let snapshot = ContentSnapshot::build(
            vec![product("A", "red cotton shirt"), flagged, product("D", "cotton shirt dress")],
            None,
        )
        .unwrap();

        let table = snapshot.recommend_by_product_id("A", 5, &FlaggedPolicy).unwrap();
        assert_eq!(table.product_ids(), vec!["D"]);

        let table = snapshot.recommend_by_keyword("blue", 5, &FlaggedPolicy);
        assert!(table.is_empty());
    }

    #[test]
    fn test_top_k_truncates() {
        let products = (0..20)
            .map(|i| product(&i.to_string(), &format!("cotton shirt style{}", i)))
            .collect();
        let snapshot = ContentSnapshot::build(products, None).unwrap();
        assert_eq!(snapshot.recommend_by_product_id("0", 3, &AllowAll).unwrap().len(), 3);
        assert_eq!(snapshot.recommend_by_keyword("cotton", 4, &AllowAll).len(), 4);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let products = vec![
            product("q", "cotton"),
            product("r", "cotton shirt"),
            product("s", "cotton shirt"),
            product("t", "cotton shirt"),
        ];
        let snapshot = ContentSnapshot::build(products, None).unwrap();
        let table = snapshot.recommend_by_product_id("q", 3, &AllowAll).unwrap();
        assert_eq!(table.product_ids(), vec!["r", "s", "t"]);
    }

    #[test]
    fn test_light_variant_filters_and_caps() {
        let mut products: Vec<Product> = (0..10)
            .map(|i| product(&i.to_string(), "cotton shirt"))
            .collect();
        products[0].price = 0.0;
        products[1].possibly_female = true;

        let picked = BuildVariant::Light {
            max_products: 4,
            seed: 42,
        }
        .select(products.clone());
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|p| p.price > 0.0 && !p.possibly_female));

        let again = BuildVariant::Light {
            max_products: 4,
            seed: 42,
        }
        .select(products);
        assert_eq!(picked, again);
    }

    #[test]
    fn test_full_variant_drops_empty_text() {
        let products = vec![product("1", "cotton shirt"), product("2", "")];
        assert_eq!(BuildVariant::Full.select(products).len(), 1);
    }

    #[test]
    fn test_misaligned_snapshot_rejected() {
        let snapshot = shirts();
        let mut value = serde_json::to_value(&snapshot).unwrap();
        value["products"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<ContentSnapshot>(value).unwrap_err();
        assert!(err.to_string().contains("corrupt snapshot"));
    }

    #[test]
    fn test_duplicate_id_rows_excluded_from_own_results() {
        let snapshot = ContentSnapshot::build(
            vec![
                product("A", "red cotton shirt"),
                product("B", "blue cotton shirt"),
                product("C", "leather shoe"),
                product("A", "red cotton shirt v2"),
            ],
            None,
        )
        .unwrap();

        let table = snapshot.recommend_by_product_id("A", 10, &AllowAll).unwrap();
        assert!(!table.product_ids().contains(&"A"));
        assert_eq!(table.product_ids(), vec!["B"]);
    }

    #[test]
    fn test_built_matrix_has_unit_diagonal_and_is_symmetric() {
        let snapshot = ContentSnapshot::build(
            vec![
                product("1", "red cotton shirt"),
                product("2", "blue cotton shirt"),
                product("3", "leather shoe"),
                product("4", "cotton shirt dress"),
                product("5", "wool"),
                product("6", ""),
            ],
            None,
        )
        .unwrap();
        let matrix = snapshot.similarity();
        let n = snapshot.products().len();

        assert_eq!(matrix.len(), n);
        for i in 0..n {
            assert_eq!(matrix.get(i, i), 1.0);
            for j in 0..n {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_out_of_range_vocabulary_index_rejected() {
        let mut value = serde_json::to_value(shirts()).unwrap();
        let vocabulary = value["vectorizer"]["vocabulary"].as_object_mut().unwrap();
        let term = vocabulary.keys().next().unwrap().clone();
        vocabulary.insert(term, serde_json::json!(10_000));

        let err = serde_json::from_value::<ContentSnapshot>(value).unwrap_err();
        assert!(err.to_string().contains("corrupt snapshot"));
    }

    #[test]
    fn test_truncated_idf_rejected() {
        let mut value = serde_json::to_value(shirts()).unwrap();
        value["vectorizer"]["idf"].as_array_mut().unwrap().truncate(1);

        let err = serde_json::from_value::<ContentSnapshot>(value).unwrap_err();
        assert!(err.to_string().contains("corrupt snapshot"));
    }
}
