use super::Embedding;
use nalgebra::{DMatrix, SymmetricEigen};

/// Eigenvalues at or below this are treated as floating point noise.
pub const EIGEN_ZERO: f64 = 1e-5;

/// Double-centers a squared distance matrix around leaf 0:
/// `M[i,j] = (D[0,i] + D[0,j] - D[i,j]) / 2`.
pub fn gram_matrix(sqrd: &DMatrix<f64>) -> DMatrix<f64> {
    let n = sqrd.nrows();
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        let di = sqrd[(0, i)];
        for j in i..n {
            let value = (di + sqrd[(0, j)] - sqrd[(i, j)]) / 2.0;
            m[(i, j)] = value;
            m[(j, i)] = value;
        }
    }
    m
}

/// Classical multidimensional scaling.
///
/// Keeps every eigenpair whose eigenvalue exceeds [`EIGEN_ZERO`], most
/// significant first; `max_dimensions > 0` additionally caps the count.
/// Negative eigenvalues (non-Euclidean input) are dropped with the noise.
pub fn embed(sqrd: &DMatrix<f64>, max_dimensions: usize) -> Embedding {
    let n = sqrd.nrows();
    if n == 0 {
        return Embedding::from_row_major(0, 0, Vec::new());
    }

    let eigen = SymmetricEigen::new(gram_matrix(sqrd));
    let mut order: Vec<usize> = (0..eigen.eigenvalues.len())
        .filter(|&k| eigen.eigenvalues[k] > EIGEN_ZERO)
        .collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
    if max_dimensions > 0 {
        order.truncate(max_dimensions);
    }

    let dims = order.len();
    let mut values = vec![0.0; n * dims];
    for (col, &k) in order.iter().enumerate() {
        let scale = eigen.eigenvalues[k].sqrt();
        let vector = eigen.eigenvectors.column(k);
        for row in 0..n {
            values[row * dims + col] = vector[row] * scale;
        }
    }
    Embedding::from_row_major(n, dims, values)
}
