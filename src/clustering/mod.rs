pub mod refinement;
pub mod scoring;
pub mod species;
pub mod types;

use crate::embedding::Embedding;
use crate::error::{MiphyError, Result};
use crate::phylo::{ensure_bifurcating, NodeId, ParsedTree};
use std::cmp::Ordering;

pub use refinement::average_spread;
pub use scoring::ScoreTable;
pub use species::SpeciesTree;
pub use types::{
    Cluster, ClusterOptions, ClusterResult, EventCounts, NodeRecord, RelativeAverage, SpeciesMap, WeightKey,
    Weights,
};

/// A validated gene tree reconciled against a species tree.
///
/// Construction checks everything that can be checked up front (binary
/// topology, complete species mapping, species present in the species
/// tree), so that [`Clusterer::cluster`] only fails on a mismatched
/// embedding.
#[derive(Debug, Clone)]
pub struct Clusterer {
    gene: ParsedTree,
    species: SpeciesTree,
    /// Gene-tree post-order.
    order: Vec<NodeId>,
    /// Species of each gene leaf, indexed by gene node id.
    leaf_species: Vec<Option<NodeId>>,
    options: ClusterOptions,
}

impl Clusterer {
    pub fn new(gene: ParsedTree, species: SpeciesTree, mapping: &SpeciesMap) -> Result<Self> {
        ensure_bifurcating(&gene)?;

        for name in mapping.values() {
            if species.species_id(name).is_none() {
                return Err(MiphyError::validation(format!(
                    "the species \"{}\" was assigned sequences but is not a leaf of the species tree",
                    name
                )));
            }
        }

        let mut leaf_species = vec![None; gene.len()];
        for &leaf in gene.leaves() {
            let name = gene.name(leaf);
            let species_name = mapping.get(name).ok_or_else(|| {
                MiphyError::validation(format!(
                    "a sequence named \"{}\" was not mapped to a species in the information file",
                    name
                ))
            })?;
            leaf_species[leaf] = species.species_id(species_name);
        }

        let order = gene.postorder();
        Ok(Self {
            gene,
            species,
            order,
            leaf_species,
            options: ClusterOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ClusterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    pub fn gene_tree(&self) -> &ParsedTree {
        &self.gene
    }

    pub fn species_tree(&self) -> &SpeciesTree {
        &self.species
    }

    /// Species name of a gene leaf.
    pub fn species_of(&self, leaf: &str) -> Option<&str> {
        let id = self.gene.id(leaf)?;
        self.leaf_species.get(id).copied().flatten().map(|s| self.species.name(s))
    }

    /// Runs the event pass and, with an embedding, the refinement pass.
    pub fn cluster(&self, weights: &Weights, embedding: Option<&Embedding>) -> Result<ClusterResult> {
        if let Some(embedding) = embedding {
            if embedding.rows() != self.gene.leaf_count() {
                return Err(MiphyError::validation(format!(
                    "the coordinates hold {} rows but the gene tree has {} sequences",
                    embedding.rows(),
                    self.gene.leaf_count()
                )));
            }
        }

        let mut table = self.first_pass(weights)?;
        let refined = match embedding {
            Some(embedding) => self.refine(&mut table, weights, embedding)?,
            None => false,
        };

        Ok(ClusterResult {
            weights: *weights,
            clusters: self.collect_clusters(&table)?,
            refined,
        })
    }

    fn collect_clusters(&self, table: &ScoreTable) -> Result<Vec<Cluster>> {
        let leaves = self.gene.leaves();
        let mut clusters = Vec::new();
        for root in table.cluster_roots(&self.gene)? {
            let record = table.get(root)?;
            let mut names: Vec<String> = record
                .leaves
                .iter()
                .map(|&slot| self.gene.name(leaves[slot]).to_string())
                .collect();
            names.sort();
            clusters.push(Cluster {
                root: self.gene.name(root).to_string(),
                leaves: names,
                score: record.total_score,
                events: record.events(),
            });
        }

        clusters.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.leaves.first().cmp(&b.leaves.first()),
            other => other,
        });
        Ok(clusters)
    }
}

/// One-shot clustering of a gene tree.
pub fn cluster(
    tree: &ParsedTree,
    species_tree: &SpeciesTree,
    mapping: &SpeciesMap,
    weights: &Weights,
    embedding: Option<&Embedding>,
) -> Result<ClusterResult> {
    Clusterer::new(tree.clone(), species_tree.clone(), mapping)?.cluster(weights, embedding)
}
