pub mod distance;
pub mod mds;
pub mod store;

use crate::error::Result;
use crate::phylo::ParsedTree;
use serde::{Deserialize, Serialize};

pub use distance::{compute_distances, ensure_finite, DistanceContext};
pub use mds::{embed, EIGEN_ZERO};
pub use store::{load_embedding, load_if_current, save_embedding};

/// Leaf coordinates, one row per leaf in the tree's sorted leaf order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    rows: usize,
    dims: usize,
    values: Vec<f64>,
}

impl Embedding {
    pub fn from_row_major(rows: usize, dims: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * dims);
        Self { rows, dims, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dims..(i + 1) * self.dims]
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.row(i)
            .iter()
            .zip(self.row(j))
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Root-mean-square distance of the given rows from their centroid.
    pub fn spread(&self, rows: &[usize]) -> f64 {
        if rows.len() < 2 || self.dims == 0 {
            return 0.0;
        }
        let mut centroid = vec![0.0; self.dims];
        for &r in rows {
            for (c, v) in centroid.iter_mut().zip(self.row(r)) {
                *c += v;
            }
        }
        let count = rows.len() as f64;
        centroid.iter_mut().for_each(|c| *c /= count);

        let sum_sq: f64 = rows
            .iter()
            .map(|&r| self.row(r).iter().zip(&centroid).map(|(v, c)| (v - c) * (v - c)).sum::<f64>())
            .sum();
        (sum_sq / count).sqrt()
    }
}

/// Distance matrix followed by classical MDS.
pub fn compute_embedding(tree: &ParsedTree, max_dimensions: usize) -> Result<Embedding> {
    let sqrd = compute_distances(tree);
    ensure_finite(&sqrd)?;
    Ok(embed(&sqrd, max_dimensions))
}
