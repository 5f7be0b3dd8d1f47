//! Sparse vectors and the pairwise cosine-similarity matrix.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sparse vector with strictly increasing feature indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build a vector from parallel index/value lists already sorted by index.
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        SparseVector { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Whether the index/value lists are parallel, sorted and all below `dim`.
    pub fn fits_dimension(&self, dim: usize) -> bool {
        self.indices.len() == self.values.len()
            && self.indices.windows(2).all(|w| w[0] < w[1])
            && self.indices.last().map_or(true, |&last| last < dim)
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for val in &mut self.values {
                *val /= norm;
            }
        }
    }

    /// Dot product by merging the two sorted index lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity, zero when either side has no weight.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }
}

/// Dense symmetric N×N cosine-similarity matrix over a product corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    scores: Array2<f64>,
}

impl SimilarityMatrix {
    /// Compute all pairwise cosine similarities.
    ///
    /// Only the upper triangle is computed; the lower one is mirrored so the
    /// matrix is exactly symmetric. The diagonal is fixed at 1.0, including for
    /// documents with no vocabulary term.
    pub fn from_vectors(vectors: &[SparseVector]) -> Self {
        let n = vectors.len();
        let mut scores = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            scores[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let sim = vectors[i].cosine(&vectors[j]);
                scores[[i, j]] = sim;
                scores[[j, i]] = sim;
            }
        }
        SimilarityMatrix { scores }
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_square(&self) -> bool {
        self.scores.nrows() == self.scores.ncols()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[[i, j]]
    }

    /// Similarities of row `i` against every column, in column order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        self.scores.row(i).into_iter().copied()
    }
}

/// Rank `(index, score)` pairs by descending score.
///
/// The sort is stable, so equal scores keep their original index order.
pub fn rank_descending(scores: impl IntoIterator<Item = (usize, f64)>) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> Vec<SparseVector> {
        let mut a = SparseVector::new(vec![0, 2], vec![1.0, 1.0]);
        let mut b = SparseVector::new(vec![1, 2], vec![1.0, 1.0]);
        let mut c = SparseVector::new(vec![3], vec![2.0]);
        a.l2_normalize();
        b.l2_normalize();
        c.l2_normalize();
        vec![a, b, c, SparseVector::default()]
    }

    #[test]
    fn test_dot_merges_indices() {
        let v = vectors();
        assert!((v[0].dot(&v[1]) - 0.5).abs() < 1e-12);
        assert_eq!(v[0].dot(&v[2]), 0.0);
    }

    #[test]
    fn test_cosine_with_empty_vector_is_zero() {
        let v = vectors();
        assert_eq!(v[0].cosine(&v[3]), 0.0);
        assert_eq!(v[3].cosine(&v[3]), 0.0);
    }

    #[test]
    fn test_matrix_diagonal_is_one() {
        let m = SimilarityMatrix::from_vectors(&vectors());
        for i in 0..m.len() {
            assert_eq!(m.get(i, i), 1.0);
        }
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let m = SimilarityMatrix::from_vectors(&vectors());
        assert!(m.is_square());
        for i in 0..m.len() {
            for j in 0..m.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert!((m.get(0, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let ranked = rank_descending(vec![(0, 0.2), (1, 0.9), (2, 0.2), (3, 0.9)]);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }
}
