use crate::error::{MiphyError, Result};
use std::collections::HashMap;

/// Branch length used for edges that carry no length in the source text.
pub const DEFAULT_BRANCH_LENGTH: f64 = 0.01;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Length of the edge to the parent, as written in the source.
    pub(crate) length: Option<f64>,
    /// True when the parser had to invent the name.
    pub(crate) synthetic: bool,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Edge weight to the parent, falling back to [`DEFAULT_BRANCH_LENGTH`].
    pub fn branch_length(&self) -> f64 {
        self.length.unwrap_or(DEFAULT_BRANCH_LENGTH)
    }
}

/// A rooted tree stored as an arena of nodes with unique string names.
///
/// Leaves are kept sorted by name; that order is the row order of every
/// per-leaf array (distance matrix, embedding coordinates).
#[derive(Debug, Clone)]
pub struct ParsedTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    leaves: Vec<NodeId>,
    leaf_slots: HashMap<NodeId, usize>,
    paths: Vec<Vec<NodeId>>,
}

impl ParsedTree {
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>, root: NodeId) -> Result<Self> {
        if root >= nodes.len() {
            return Err(MiphyError::parse("tree has no root node"));
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (id, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), id).is_some() {
                return Err(MiphyError::validation(format!(
                    "multiple nodes named \"{}\" were found in the tree",
                    node.name
                )));
            }
        }

        let paths = build_root_paths(&nodes, root)?;

        let mut leaves: Vec<NodeId> = (0..nodes.len()).filter(|&id| nodes[id].is_leaf()).collect();
        leaves.sort_by(|a, b| nodes[*a].name.cmp(&nodes[*b].name));
        let leaf_slots = leaves.iter().enumerate().map(|(slot, &id)| (id, slot)).collect();

        Ok(Self {
            nodes,
            index,
            root,
            leaves,
            leaf_slots,
            paths,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_name(&self) -> &str {
        &self.nodes[self.root].name
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Leaf ids in sorted-name order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves.iter().map(|&id| self.name(id)).collect()
    }

    /// Position of a leaf in the sorted leaf order.
    pub fn leaf_slot(&self, id: NodeId) -> Option<usize> {
        self.leaf_slots.get(&id).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Root-first path ending at `id`.
    pub fn path(&self, id: NodeId) -> &[NodeId] {
        &self.paths[id]
    }

    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        self.paths[id].iter().map(|&n| self.name(n)).collect()
    }

    /// Weight of the edge `parent -> child`, if those nodes are adjacent.
    pub fn edge_weight(&self, parent: &str, child: &str) -> Option<f64> {
        let child_id = self.id(child)?;
        let parent_id = self.id(parent)?;
        (self.nodes[child_id].parent == Some(parent_id)).then(|| self.nodes[child_id].branch_length())
    }

    /// All `(parent, child, weight)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.nodes.iter().filter_map(move |node| {
            node.parent
                .map(|p| (self.nodes[p].name.as_str(), node.name.as_str(), node.branch_length()))
        })
    }

    pub fn parent_map(&self) -> HashMap<&str, &str> {
        self.nodes
            .iter()
            .filter_map(|node| node.parent.map(|p| (node.name.as_str(), self.nodes[p].name.as_str())))
            .collect()
    }

    /// Node ids with every child listed before its parent.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.nodes[id].children.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Leaf ids below `id`, in tree order.
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_leaf() {
                found.push(current);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        found
    }

    /// Renames leaves through `table`; names missing from the table are kept.
    pub fn rename_leaves(self, table: &HashMap<String, String>) -> Result<Self> {
        let root = self.root;
        let mut nodes = self.nodes;
        for node in nodes.iter_mut().filter(|n| n.is_leaf()) {
            if let Some(renamed) = table.get(&node.name) {
                node.name = renamed.clone();
                node.synthetic = false;
            }
        }
        Self::from_nodes(nodes, root)
    }

    pub(crate) fn into_nodes(self) -> (Vec<TreeNode>, NodeId) {
        (self.nodes, self.root)
    }
}

fn build_root_paths(nodes: &[TreeNode], root: NodeId) -> Result<Vec<Vec<NodeId>>> {
    let mut paths = Vec::with_capacity(nodes.len());
    for (id, node) in nodes.iter().enumerate() {
        let mut path = vec![id];
        let mut current = id;
        while current != root {
            let parent = nodes[current].parent.ok_or_else(|| {
                MiphyError::parse(format!("node \"{}\" is not connected to the root", node.name))
            })?;
            if parent >= nodes.len() {
                return Err(MiphyError::parse(format!(
                    "node \"{}\" has a dangling parent reference",
                    nodes[current].name
                )));
            }
            path.push(parent);
            if path.len() > nodes.len() {
                return Err(MiphyError::parse(format!(
                    "cycle detected while walking from \"{}\" to the root",
                    node.name
                )));
            }
            current = parent;
        }
        path.reverse();
        paths.push(path);
    }
    Ok(paths)
}
