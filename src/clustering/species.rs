use crate::error::{MiphyError, Result};
use crate::phylo::{parse_newick, NodeId, ParsedTree};
use std::collections::BTreeSet;

/// Species tree used for ancestry lookups during reconciliation.
///
/// Species are the leaves; internal nodes only matter as common ancestors.
/// Multifurcations are allowed.
#[derive(Debug, Clone)]
pub struct SpeciesTree {
    tree: ParsedTree,
    all_species: BTreeSet<NodeId>,
}

impl SpeciesTree {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(MiphyError::validation("the species tree is empty"));
        }
        Ok(Self::from_tree(parse_newick(text)?))
    }

    pub fn from_tree(tree: ParsedTree) -> Self {
        let all_species = tree.leaves().iter().copied().collect();
        Self { tree, all_species }
    }

    pub fn tree(&self) -> &ParsedTree {
        &self.tree
    }

    pub fn species_count(&self) -> usize {
        self.all_species.len()
    }

    pub fn species_names(&self) -> Vec<&str> {
        self.tree.leaf_names()
    }

    pub fn all_species(&self) -> &BTreeSet<NodeId> {
        &self.all_species
    }

    /// Id of a species (a leaf of the species tree).
    pub fn species_id(&self, name: &str) -> Option<NodeId> {
        self.tree.id(name).filter(|id| self.all_species.contains(id))
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.tree.name(id)
    }

    /// Lowest common ancestor, walking both root paths in lockstep.
    pub fn lca(&self, a: NodeId, b: NodeId) -> NodeId {
        if a == b {
            return a;
        }
        let mut ancestor = self.tree.root();
        for (x, y) in self.tree.path(a).iter().zip(self.tree.path(b)) {
            if x != y {
                break;
            }
            ancestor = *x;
        }
        ancestor
    }

    /// True when `ancestor` lies on the root path of `node` (inclusive).
    pub fn on_root_path(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.path(node).contains(&ancestor)
    }

    /// Minimum number of independent losses explaining `missing` lineages
    /// given the `present` ones: the largest number of distinct
    /// `lca(g, m)` over `m` in `missing`, for any `g` in `present`.
    pub fn loss_events(&self, present: &BTreeSet<NodeId>, missing: &BTreeSet<NodeId>) -> u32 {
        if missing.len() <= 1 {
            return missing.len() as u32;
        }
        present
            .iter()
            .map(|&g| {
                missing
                    .iter()
                    .filter(|m| !present.contains(m))
                    .map(|&m| self.lca(g, m))
                    .collect::<BTreeSet<_>>()
                    .len() as u32
            })
            .max()
            .unwrap_or(0)
    }

    /// Name-based form of [`loss_events`](Self::loss_events).
    pub fn loss_count(&self, present: &[&str], missing: &[&str]) -> Result<u32> {
        let present = self.resolve(present)?;
        let missing = self.resolve(missing)?;
        Ok(self.loss_events(&present, &missing))
    }

    fn resolve(&self, names: &[&str]) -> Result<BTreeSet<NodeId>> {
        names
            .iter()
            .map(|name| {
                self.species_id(name).ok_or_else(|| {
                    MiphyError::validation(format!("species \"{}\" is not in the species tree", name))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lca_of_sisters_and_outgroup() {
        let species = SpeciesTree::parse("(A,(B,C)BC)root;").unwrap();
        let (a, b, c) = (
            species.species_id("A").unwrap(),
            species.species_id("B").unwrap(),
            species.species_id("C").unwrap(),
        );
        assert_eq!(species.name(species.lca(b, c)), "BC");
        assert_eq!(species.name(species.lca(a, c)), "root");
        assert_eq!(species.lca(a, a), a);
        assert!(species.on_root_path(species.lca(b, c), b));
        assert!(!species.on_root_path(a, b));
    }

    #[test]
    fn internal_nodes_are_not_species() {
        let species = SpeciesTree::parse("(A,(B,C)BC);").unwrap();
        assert!(species.species_id("BC").is_none());
        assert_eq!(species.species_count(), 3);
    }
}
