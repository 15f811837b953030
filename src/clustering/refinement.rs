use super::scoring::ScoreTable;
use super::types::{RelativeAverage, Weights};
use super::Clusterer;
use crate::embedding::Embedding;
use crate::error::{MiphyError, Result};

/// Median (mean of the two central values for even counts) or mean.
pub fn average_spread(spreads: &[f64], how: RelativeAverage) -> Option<f64> {
    if spreads.is_empty() {
        return None;
    }
    match how {
        RelativeAverage::Mean => Some(spreads.iter().sum::<f64>() / spreads.len() as f64),
        RelativeAverage::Median => {
            let mut sorted = spreads.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = (sorted.len() + 1) / 2 - 1;
            Some((sorted[mid] + sorted[sorted.len() - 1 - mid]) / 2.0)
        }
    }
}

impl Clusterer {
    /// Population spread of the current multi-sequence clusters.
    pub fn baseline_spread(&self, table: &ScoreTable, embedding: &Embedding) -> Result<Option<f64>> {
        let mut spreads = Vec::new();
        for root in table.cluster_roots(&self.gene)? {
            let record = table.get(root)?;
            if record.leaves.len() > 1 {
                spreads.push(embedding.spread(&record.leaves));
            }
        }
        Ok(average_spread(&spreads, self.options.relative_average))
    }

    fn spread_score(&self, leaves: &[usize], embedding: &Embedding, baseline: f64) -> f64 {
        if leaves.len() == 1 {
            self.options.singleton_spread
        } else {
            embedding.spread(leaves) / baseline - 1.0
        }
    }

    /// Second post-order walk adding the normalized spread term.
    ///
    /// Returns false, leaving the table untouched, when there is no usable
    /// baseline (no multi-sequence cluster, or all of them have zero spread).
    pub(super) fn refine(&self, table: &mut ScoreTable, weights: &Weights, embedding: &Embedding) -> Result<bool> {
        let baseline = match self.baseline_spread(table, embedding)? {
            Some(baseline) if baseline > f64::EPSILON => baseline,
            _ => return Ok(false),
        };

        for &id in &self.order {
            match self.gene.children(id) {
                [] => {
                    let singleton = self.options.singleton_spread * weights.spread;
                    let record = table.get_mut(id)?;
                    record.total_score = record.event_score + singleton;
                    record.merged = true;
                    record.spread = None;
                }
                [first, second] => {
                    let separate = table.get(*first)?.total_score + table.get(*second)?.total_score;
                    let record = table.get(id)?;
                    let spread = self.spread_score(&record.leaves, embedding, baseline);
                    let combined = record.combined_event_score + spread * weights.spread;

                    let record = table.get_mut(id)?;
                    if separate < combined {
                        record.total_score = separate;
                        record.merged = false;
                        record.spread = None;
                    } else {
                        record.total_score = combined;
                        record.merged = true;
                        record.spread = Some(spread);
                    }
                }
                other => {
                    return Err(MiphyError::validation(format!(
                        "the gene tree must be binary, but node \"{}\" has {} children",
                        self.gene.name(id),
                        other.len()
                    )))
                }
            }
        }
        Ok(true)
    }
}
