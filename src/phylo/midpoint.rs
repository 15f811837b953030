use super::types::{NodeId, ParsedTree, TreeNode};
use crate::error::{MiphyError, Result};
use std::collections::HashSet;

/// Re-roots the tree halfway along its longest leaf-to-leaf path.
///
/// The old root is spliced out when it is left with a single child, so a
/// bifurcating input stays bifurcating.
pub fn midpoint_root(tree: &ParsedTree) -> Result<ParsedTree> {
    if tree.leaf_count() < 2 {
        return Ok(tree.clone());
    }

    let adjacency = undirected(tree);
    let start = tree.leaves()[0];
    let (far_a, _, _) = farthest_leaf(tree, &adjacency, start);
    let (far_b, distance, previous) = farthest_leaf(tree, &adjacency, far_a);
    if far_b == far_a {
        // every leaf sits at distance zero
        return Ok(tree.clone());
    }

    // Walk the path a -> b and find the edge holding the midpoint.
    let mut path = vec![far_b];
    let mut current = far_b;
    while current != far_a {
        current = previous[current].ok_or_else(|| MiphyError::parse("tree is not connected"))?;
        path.push(current);
    }
    path.reverse();

    let half = distance[far_b] / 2.0;
    let (mut near, mut far) = (path[0], path[1]);
    for pair in path.windows(2) {
        (near, far) = (pair[0], pair[1]);
        if distance[far] > half {
            break;
        }
    }
    let edge_length = distance[far] - distance[near];
    let near_side = (half - distance[near]).clamp(0.0, edge_length);
    let far_side = edge_length - near_side;

    // Orient every edge away from the new root, which sits between `near` and `far`.
    let (old_nodes, old_root) = tree.clone().into_nodes();
    let new_root = old_nodes.len();
    let mut parent: Vec<Option<NodeId>> = vec![None; new_root + 1];
    let mut length: Vec<f64> = vec![0.0; new_root + 1];
    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); new_root + 1];

    children[new_root] = vec![near, far];
    parent[near] = Some(new_root);
    parent[far] = Some(new_root);
    length[near] = near_side;
    length[far] = far_side;

    let mut stack = vec![near, far];
    let mut seen: HashSet<NodeId> = [near, far].into_iter().collect();
    while let Some(node) = stack.pop() {
        for &(next, weight) in &adjacency[node] {
            if seen.contains(&next) || (node == near && next == far) || (node == far && next == near) {
                continue;
            }
            seen.insert(next);
            parent[next] = Some(node);
            length[next] = weight;
            children[node].push(next);
            stack.push(next);
        }
    }

    // Splice out unary nodes (the old root, typically).
    for id in 0..new_root {
        if children[id].len() == 1 {
            if let Some(up) = parent[id] {
                let only = children[id][0];
                parent[only] = Some(up);
                length[only] += length[id];
                for slot in children[up].iter_mut().filter(|c| **c == id) {
                    *slot = only;
                }
                children[id].clear();
                parent[id] = None;
            }
        }
    }

    let mut root_name = old_nodes[old_root].name.clone();
    let old_root_kept = parent[old_root].is_some();
    if old_root_kept {
        root_name = format!("{}_midpoint", root_name);
    }

    let mut remap: Vec<Option<NodeId>> = vec![None; new_root + 1];
    let mut nodes: Vec<TreeNode> = Vec::with_capacity(new_root);
    for id in (0..=new_root).filter(|&id| id == new_root || parent[id].is_some()) {
        remap[id] = Some(nodes.len());
        let (name, synthetic) = if id == new_root {
            (root_name.clone(), old_nodes[old_root].synthetic && !old_root_kept)
        } else {
            (old_nodes[id].name.clone(), old_nodes[id].synthetic)
        };
        nodes.push(TreeNode {
            name,
            parent: parent[id],
            children: children[id].clone(),
            length: (id != new_root).then_some(length[id]),
            synthetic,
        });
    }
    for node in nodes.iter_mut() {
        node.parent = node.parent.and_then(|p| remap[p]);
        node.children = node.children.iter().filter_map(|&c| remap[c]).collect();
    }
    let root = remap[new_root].ok_or_else(|| MiphyError::parse("lost the new root"))?;

    ParsedTree::from_nodes(nodes, root)
}

fn undirected(tree: &ParsedTree) -> Vec<Vec<(NodeId, f64)>> {
    let mut adjacency = vec![Vec::new(); tree.len()];
    for (id, node) in tree.nodes() {
        if let Some(parent) = node.parent() {
            adjacency[parent].push((id, node.branch_length()));
            adjacency[id].push((parent, node.branch_length()));
        }
    }
    adjacency
}

fn farthest_leaf(
    tree: &ParsedTree,
    adjacency: &[Vec<(NodeId, f64)>],
    from: NodeId,
) -> (NodeId, Vec<f64>, Vec<Option<NodeId>>) {
    let mut distance = vec![f64::NAN; tree.len()];
    let mut previous = vec![None; tree.len()];
    distance[from] = 0.0;
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        for &(next, weight) in &adjacency[node] {
            if distance[next].is_nan() {
                distance[next] = distance[node] + weight;
                previous[next] = Some(node);
                stack.push(next);
            }
        }
    }
    let mut best = from;
    for &leaf in tree.leaves() {
        if distance[leaf] > distance[best] {
            best = leaf;
        }
    }
    (best, distance, previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::newick::parse_newick;
    use crate::phylo::validation::ensure_bifurcating;

    #[test]
    fn midpoint_balances_the_longest_path() {
        let tree = parse_newick("((a:1,b:1):1,c:9);").unwrap();
        let rooted = midpoint_root(&tree).unwrap();
        ensure_bifurcating(&rooted).unwrap();
        let root = rooted.root();
        let sides: Vec<f64> = rooted
            .children(root)
            .iter()
            .map(|&c| {
                let leaves = rooted.leaves_under(c);
                leaves
                    .iter()
                    .map(|&l| rooted.path(l).iter().skip(1).map(|&n| rooted.node(n).branch_length()).sum::<f64>())
                    .fold(0.0, f64::max)
            })
            .collect();
        assert_eq!(sides.len(), 2);
        assert!((sides[0] - sides[1]).abs() < 1e-9, "{:?}", sides);
        assert!((sides[0] - 5.5).abs() < 1e-9);
        assert_eq!(rooted.leaf_count(), 3);
    }
}
