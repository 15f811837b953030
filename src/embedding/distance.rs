use crate::error::{MiphyError, Result};
use crate::phylo::{NodeId, ParsedTree};
use nalgebra::DMatrix;

/// Per-tree state for patristic distance queries.
///
/// Holds the cumulative root distance of every node so a leaf pair costs
/// one walk over the shared prefix of their root paths.
pub struct DistanceContext<'a> {
    tree: &'a ParsedTree,
    root_distance: Vec<f64>,
}

impl<'a> DistanceContext<'a> {
    pub fn new(tree: &'a ParsedTree) -> Self {
        let mut root_distance = vec![0.0; tree.len()];
        for id in tree.postorder().into_iter().rev() {
            if let Some(parent) = tree.parent(id) {
                root_distance[id] = root_distance[parent] + tree.node(id).branch_length();
            }
        }
        Self { tree, root_distance }
    }

    /// Most recent common ancestor, from the longest common root-path prefix.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let (path_a, path_b) = (self.tree.path(a), self.tree.path(b));
        let mut ancestor = self.tree.root();
        for (x, y) in path_a.iter().zip(path_b) {
            if x != y {
                break;
            }
            ancestor = *x;
        }
        ancestor
    }

    /// Sum of branch lengths on the path between two nodes.
    pub fn patristic(&self, a: NodeId, b: NodeId) -> f64 {
        if a == b {
            return 0.0;
        }
        let ancestor = self.common_ancestor(a, b);
        (self.root_distance[a] - self.root_distance[ancestor]) + (self.root_distance[b] - self.root_distance[ancestor])
    }

    /// Symmetric matrix of squared patristic distances between leaves,
    /// indexed by the tree's sorted leaf order.
    pub fn squared_distances(&self) -> DMatrix<f64> {
        let leaves = self.tree.leaves();
        let n = leaves.len();
        let mut sqrd = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.patristic(leaves[i], leaves[j]);
                sqrd[(i, j)] = d * d;
                sqrd[(j, i)] = d * d;
            }
        }
        sqrd
    }
}

pub fn compute_distances(tree: &ParsedTree) -> DMatrix<f64> {
    DistanceContext::new(tree).squared_distances()
}

/// Huge branch lengths overflow the squared distances to infinity.
pub fn ensure_finite(sqrd: &DMatrix<f64>) -> Result<()> {
    if sqrd.iter().all(|d| d.is_finite()) {
        return Ok(());
    }
    Err(MiphyError::validation(
        "the squared leaf distances overflow; the branch lengths are too large to compute coordinates",
    ))
}
