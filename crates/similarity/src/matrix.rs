//! Symmetric similarity matrices.
//!
//! Only the upper triangle (diagonal included) is stored, row by row, so
//! `get(i, j) == get(j, i)` holds exactly. The diagonal is always 1.0 and
//! every entry is clamped to [0, 1].

use crate::vectorizer::SparseVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    size: usize,
    packed: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build an N×N matrix from a pairwise scoring function.
    ///
    /// `score(i, j)` is only called with `i < j`. Rows are computed in parallel.
    pub fn from_fn<F>(size: usize, score: F) -> Self
    where
        F: Fn(usize, usize) -> f32 + Sync,
    {
        let rows: Vec<Vec<f32>> = (0..size)
            .into_par_iter()
            .map(|i| {
                let mut row = Vec::with_capacity(size - i);
                row.push(1.0);
                row.extend((i + 1..size).map(|j| clamp_unit(score(i, j))));
                row
            })
            .collect();

        Self {
            size,
            packed: rows.concat(),
        }
    }

    /// Cosine similarity between unit-length sparse vectors
    pub fn cosine(vectors: &[SparseVector]) -> Self {
        Self::from_fn(vectors.len(), |i, j| vectors[i].dot(&vectors[j]))
    }

    /// Jaccard overlap between sorted, deduplicated id sets.
    ///
    /// Two empty sets score 0 (nothing in common) rather than 1.
    pub fn jaccard(sets: &[Vec<u32>]) -> Self {
        Self::from_fn(sets.len(), |i, j| jaccard(&sets[i], &sets[j]))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry (i, j), or `None` when either index is out of range
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.size || j >= self.size {
            return None;
        }
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.packed.get(self.row_offset(lo) + (hi - lo)).copied()
    }

    /// Full row `i` as a dense vector of length N
    pub fn row(&self, i: usize) -> Option<Vec<f32>> {
        if i >= self.size {
            return None;
        }
        let mut row = Vec::with_capacity(self.size);
        // Column i of the rows above, then the stored tail of row i
        row.extend((0..i).map(|k| self.packed[self.row_offset(k) + (i - k)]));
        let start = self.row_offset(i);
        row.extend_from_slice(&self.packed[start..start + (self.size - i)]);
        Some(row)
    }

    /// Storage consistency check used when loading cached artifacts
    pub fn is_well_formed(&self) -> bool {
        self.packed.len() == self.size * (self.size + 1) / 2
    }

    /// Offset of (i, i) in the packed storage
    fn row_offset(&self, i: usize) -> usize {
        // Row k stores N - k entries
        i * self.size - i * i.saturating_sub(1) / 2
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn jaccard(a: &[u32], b: &[u32]) -> f32 {
    let (mut x, mut y) = (0, 0);
    let mut shared = 0usize;
    while x < a.len() && y < b.len() {
        match a[x].cmp(&b[y]) {
            std::cmp::Ordering::Less => x += 1,
            std::cmp::Ordering::Greater => y += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                x += 1;
                y += 1;
            }
        }
    }
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout_matches_dense() {
        let n = 5;
        let m = SimilarityMatrix::from_fn(n, |i, j| (i * 10 + j) as f32 / 100.0);
        assert!(m.is_well_formed());

        for i in 0..n {
            for j in 0..n {
                let expected = if i == j {
                    1.0
                } else {
                    let (lo, hi) = (i.min(j), i.max(j));
                    (lo * 10 + hi) as f32 / 100.0
                };
                assert_eq!(m.get(i, j), Some(expected), "entry ({i}, {j})");
            }
            let row = m.row(i).unwrap();
            assert_eq!(row.len(), n);
            for (j, value) in row.iter().enumerate() {
                assert_eq!(Some(*value), m.get(i, j));
            }
        }
    }

    #[test]
    fn test_entries_are_clamped() {
        let m = SimilarityMatrix::from_fn(3, |i, _| match i {
            0 => 1.5,
            _ => f32::NAN,
        });
        assert_eq!(m.get(0, 1), Some(1.0));
        assert_eq!(m.get(1, 2), Some(0.0));
    }

    #[test]
    fn test_out_of_range() {
        let m = SimilarityMatrix::from_fn(2, |_, _| 0.5);
        assert_eq!(m.get(2, 0), None);
        assert!(m.row(2).is_none());
    }

    #[test]
    fn test_jaccard() {
        let sets = vec![vec![1, 2, 3], vec![2, 3, 4], vec![], vec![]];
        let m = SimilarityMatrix::jaccard(&sets);
        assert_eq!(m.get(0, 1), Some(0.5));
        assert_eq!(m.get(0, 2), Some(0.0));
        // Empty vs empty is no evidence of similarity
        assert_eq!(m.get(2, 3), Some(0.0));
        assert_eq!(m.get(2, 2), Some(1.0));
    }

    #[test]
    fn test_single_row() {
        let m = SimilarityMatrix::from_fn(1, |_, _| 0.0);
        assert_eq!(m.row(0), Some(vec![1.0]));
    }
}
