use super::types::{NodeRecord, Weights};
use super::Clusterer;
use crate::error::{MiphyError, Result};
use crate::phylo::{NodeId, ParsedTree};
use std::collections::BTreeSet;

/// Node records for every gene-tree node, indexed by node id.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    records: Vec<Option<NodeRecord>>,
    root: NodeId,
}

impl ScoreTable {
    pub(super) fn with_capacity(len: usize, root: NodeId) -> Self {
        Self {
            records: vec![None; len],
            root,
        }
    }

    pub fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.records.get(id).and_then(Option::as_ref)
    }

    pub fn root_record(&self) -> Option<&NodeRecord> {
        self.record(self.root)
    }

    pub(super) fn get(&self, id: NodeId) -> Result<&NodeRecord> {
        self.record(id)
            .ok_or_else(|| MiphyError::runtime(format!("node {} was scored before its children", id)))
    }

    pub(super) fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord> {
        self.records
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| MiphyError::runtime(format!("node {} has no score record", id)))
    }

    pub(super) fn set(&mut self, id: NodeId, record: NodeRecord) {
        self.records[id] = Some(record);
    }

    /// Roots of the clusters currently chosen for the whole tree, found by
    /// descending from the root until a merged node is reached.
    pub fn cluster_roots(&self, tree: &ParsedTree) -> Result<Vec<NodeId>> {
        let mut roots = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.get(id)?.merged {
                roots.push(id);
            } else {
                stack.extend(tree.children(id).iter().rev());
            }
        }
        Ok(roots)
    }
}

impl Clusterer {
    /// Event classification and the event-only merge decision, in post-order.
    pub fn first_pass(&self, weights: &Weights) -> Result<ScoreTable> {
        weights.validate()?;
        let mut table = ScoreTable::with_capacity(self.gene.len(), self.gene.root());

        for &id in &self.order {
            let record = match self.gene.children(id) {
                [] => self.score_leaf(id, weights)?,
                [first, second] => {
                    let (c1, c2) = (table.get(*first)?, table.get(*second)?);
                    self.score_internal(c1, c2, weights)
                }
                other => {
                    return Err(MiphyError::validation(format!(
                        "the gene tree must be binary, but node \"{}\" has {} children",
                        self.gene.name(id),
                        other.len()
                    )))
                }
            };
            table.set(id, record);
        }
        Ok(table)
    }

    fn score_leaf(&self, id: NodeId, weights: &Weights) -> Result<NodeRecord> {
        let species = self.leaf_species[id].ok_or_else(|| {
            MiphyError::validation(format!(
                "a sequence named \"{}\" was not mapped to a species",
                self.gene.name(id)
            ))
        })?;
        let slot = self
            .gene
            .leaf_slot(id)
            .ok_or_else(|| MiphyError::runtime(format!("\"{}\" is not a leaf", self.gene.name(id))))?;

        let present: BTreeSet<NodeId> = [species].into_iter().collect();
        let baseline_losses = self.baseline_losses(&present);
        let score = baseline_losses as f64 * weights.loss;

        Ok(NodeRecord {
            rca: species,
            species: present,
            leaves: vec![slot],
            duplications: 0,
            incongruences: 0,
            losses: 0,
            baseline_losses,
            combined_event_score: score,
            event_score: score,
            total_score: score,
            spread: None,
            merged: true,
        })
    }

    fn score_internal(&self, c1: &NodeRecord, c2: &NodeRecord, weights: &Weights) -> NodeRecord {
        let rca = self.species.lca(c1.rca, c2.rca);
        let species: BTreeSet<NodeId> = c1.species.union(&c2.species).copied().collect();

        let mut duplications = c1.duplications + c2.duplications;
        let mut incongruences = c1.incongruences + c2.incongruences;
        let mut losses = c1.losses + c2.losses;

        if c1.species.is_disjoint(&c2.species) {
            // speciation; incongruent when one lineage is an ancestor of the other
            if self.species.on_root_path(c1.rca, c2.rca) || self.species.on_root_path(c2.rca, c1.rca) {
                incongruences += 1;
            }
        } else {
            duplications += 1;
            let c1_missing: BTreeSet<NodeId> = c2.species.difference(&c1.species).copied().collect();
            let c2_missing: BTreeSet<NodeId> = c1.species.difference(&c2.species).copied().collect();
            losses += self.species.loss_events(&c1.species, &c1_missing);
            losses += self.species.loss_events(&c2.species, &c2_missing);
        }

        let baseline_losses = self.baseline_losses(&species);
        let combined = duplications as f64 * weights.duplication
            + incongruences as f64 * weights.incongruence
            + (losses + baseline_losses) as f64 * weights.loss;
        let separate = c1.event_score + c2.event_score;

        // ties merge
        let merged = separate >= combined;
        let event_score = if merged { combined } else { separate };

        let mut leaves = Vec::with_capacity(c1.leaves.len() + c2.leaves.len());
        leaves.extend_from_slice(&c1.leaves);
        leaves.extend_from_slice(&c2.leaves);

        NodeRecord {
            rca,
            species,
            leaves,
            duplications,
            incongruences,
            losses,
            baseline_losses,
            combined_event_score: combined,
            event_score,
            total_score: event_score,
            spread: None,
            merged,
        }
    }

    fn baseline_losses(&self, present: &BTreeSet<NodeId>) -> u32 {
        let missing: BTreeSet<NodeId> = self.species.all_species().difference(present).copied().collect();
        self.species.loss_events(present, &missing)
    }
}
