//! TF-IDF (Term Frequency-Inverse Document Frequency) vectorizer implementation.
//!
//! The vectorizer is fit once over the product corpus and then reused to map both
//! corpus documents and free-text queries into the same sparse feature space.
//! Terms outside the fitted vocabulary are ignored at transform time.

use super::similarity::SparseVector;
use super::stopwords::is_stop_word;
use crate::error::{RecommendError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"))
}

/// Split text into lower-cased word tokens of two or more characters, without stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowercase = text.to_lowercase();
    token_pattern()
        .find_iter(&lowercase)
        .map(|m| m.as_str())
        .filter(|w| !is_stop_word(w))
        .map(|s| s.to_string())
        .collect()
}

/// TF-IDF vectorizer for converting text to sparse numerical features.
///
/// This implementation:
/// - Tokenizes on word boundaries, keeping tokens of at least 2 characters
/// - Removes English stop words
/// - Optionally keeps only the N most frequent terms
/// - Weights raw counts by smoothed IDF and applies L2 normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Word to feature index mapping (indices follow lexicographic term order)
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each feature
    pub idf: Vec<f64>,
    /// Maximum number of features to keep, unbounded when `None`
    pub max_features: Option<usize>,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer.
    ///
    /// # Arguments
    ///
    /// * `max_features` - Optional cap on the number of terms kept
    pub fn new(max_features: Option<usize>) -> Self {
        TfidfVectorizer {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            max_features,
        }
    }

    /// Fit the vectorizer on a collection of documents.
    ///
    /// This builds the vocabulary and calculates IDF values as
    /// `ln((1 + n) / (1 + df)) + 1`.
    ///
    /// # Errors
    ///
    /// Fails when the corpus is empty or when no term survives tokenization.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(RecommendError::EmptyCorpus);
        }

        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let words = tokenize(doc);
            let unique_words: HashSet<&String> = words.iter().collect();
            for word in unique_words {
                *doc_freq.entry(word.clone()).or_insert(0) += 1;
            }
            for word in words {
                *term_freq.entry(word).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(RecommendError::EmptyVocabulary);
        }

        let mut kept: Vec<&String> = doc_freq.keys().collect();
        if let Some(limit) = self.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| term_freq[*b].cmp(&term_freq[*a]).then_with(|| a.cmp(b)));
                kept.truncate(limit);
                kept.sort();
            }
        }

        let n_docs = documents.len() as f64;
        self.vocabulary = HashMap::with_capacity(kept.len());
        self.idf = Vec::with_capacity(kept.len());
        for (idx, word) in kept.into_iter().enumerate() {
            let df = doc_freq[word] as f64;
            self.vocabulary.insert(word.clone(), idx);
            self.idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
        }

        Ok(())
    }

    /// Fit on the corpus and return the corpus vectors in input order.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        Ok(documents.iter().map(|d| self.transform(d)).collect())
    }

    /// Transform a document into an L2-normalized TF-IDF vector.
    ///
    /// Out-of-vocabulary terms contribute nothing; a document with no known
    /// term maps to the empty vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for word in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(&word) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let (indices, values): (Vec<usize>, Vec<f64>) = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .unzip();

        let mut vector = SparseVector::new(indices, values);
        vector.l2_normalize();
        vector
    }

    /// Number of features in the fitted vocabulary.
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}
