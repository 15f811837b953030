use crate::error::{MiphyError, Result};
use crate::phylo::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Gene (leaf) name -> species name.
pub type SpeciesMap = BTreeMap<String, String>;

/// Event costs for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub incongruence: f64,
    pub duplication: f64,
    pub loss: f64,
    pub spread: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            incongruence: 0.5,
            duplication: 1.0,
            loss: 1.0,
            spread: 1.0,
        }
    }
}

impl Weights {
    pub fn new(incongruence: f64, duplication: f64, loss: f64, spread: f64) -> Result<Self> {
        let weights = Self {
            incongruence,
            duplication,
            loss,
            spread,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        let all = [self.incongruence, self.duplication, self.loss, self.spread];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MiphyError::validation(format!(
                "all weight values must be non-negative numbers, got {}",
                self
            )));
        }
        Ok(())
    }

    /// Cache key; `-0.0` and `0.0` map to the same key.
    pub fn key(&self) -> WeightKey {
        let bits = |w: f64| if w == 0.0 { 0u64 } else { w.to_bits() };
        WeightKey([
            bits(self.incongruence),
            bits(self.duplication),
            bits(self.loss),
            bits(self.spread),
        ])
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.incongruence, self.duplication, self.loss, self.spread
        )
    }
}

/// Parses `inc,dup,loss,spread`.
impl FromStr for Weights {
    type Err = MiphyError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(MiphyError::validation(format!(
                "weights must be given as INC,DUP,LOSS,SPREAD, got \"{}\"",
                s
            )));
        }
        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| MiphyError::validation(format!("could not read the weight \"{}\"", part)))?;
        }
        Weights::new(values[0], values[1], values[2], values[3])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightKey([u64; 4]);

/// How the population baseline spread is aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeAverage {
    #[default]
    Median,
    Mean,
}

impl FromStr for RelativeAverage {
    type Err = MiphyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(RelativeAverage::Median),
            "mean" => Ok(RelativeAverage::Mean),
            _ => Err(MiphyError::validation(format!(
                "incorrect value \"{}\" for the relative average; must be either \"mean\" or \"median\"",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    pub relative_average: RelativeAverage,
    /// Spread score given to single-sequence clusters.
    pub singleton_spread: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            relative_average: RelativeAverage::Median,
            singleton_spread: 0.0,
        }
    }
}

/// Event tally reported for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventCounts {
    pub duplications: u32,
    pub incongruences: u32,
    /// Losses from duplications plus the baseline losses of the cluster root.
    pub losses: u32,
    /// Normalized spread score, when the refinement pass merged this cluster.
    pub spread: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub root: String,
    pub leaves: Vec<String>,
    pub score: f64,
    pub events: EventCounts,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

/// Clusters for one weight tuple, sorted by descending instability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub weights: Weights,
    pub clusters: Vec<Cluster>,
    /// False when the refinement pass did not run.
    pub refined: bool,
}

impl ClusterResult {
    /// Score and event tally of each leaf's cluster, keyed by leaf name.
    pub fn scores(&self) -> BTreeMap<&str, (f64, EventCounts)> {
        self.clusters
            .iter()
            .flat_map(|c| c.leaves.iter().map(move |leaf| (leaf.as_str(), (c.score, c.events))))
            .collect()
    }

    pub fn cluster_of(&self, leaf: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.leaves.iter().any(|l| l == leaf))
    }
}

/// Per gene-tree node state for one weight tuple.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Species tree node reconciled with this gene node.
    pub rca: NodeId,
    pub species: BTreeSet<NodeId>,
    /// Leaf slots (sorted leaf order) below this node.
    pub leaves: Vec<usize>,
    pub duplications: u32,
    pub incongruences: u32,
    pub losses: u32,
    /// Losses implied by the species missing under this node.
    pub baseline_losses: u32,
    /// Cost of explaining the whole subtree as one cluster.
    pub combined_event_score: f64,
    /// Best score from the event-only pass.
    pub event_score: f64,
    /// Best score after refinement; equals `event_score` when not refined.
    pub total_score: f64,
    pub spread: Option<f64>,
    /// Whether the subtree is kept as a single cluster rooted here.
    pub merged: bool,
}

impl NodeRecord {
    pub fn events(&self) -> EventCounts {
        EventCounts {
            duplications: self.duplications,
            incongruences: self.incongruences,
            losses: self.losses + self.baseline_losses,
            spread: self.spread,
        }
    }
}
