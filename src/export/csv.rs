use crate::clustering::ClusterResult;
use crate::error::{MiphyError, Result};
use crate::session::Session;
use std::collections::BTreeSet;

/// Rejects species in `only_species` that the session does not know.
pub fn check_species_filter(session: &Session, only_species: &[String]) -> Result<()> {
    let unknown: BTreeSet<&str> = only_species
        .iter()
        .map(String::as_str)
        .filter(|s| session.species().iter().all(|known| known != s))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(MiphyError::validation(format!(
        "these species specified by --only-species were not found in the information file: {}",
        unknown.into_iter().collect::<Vec<_>>().join(", ")
    )))
}

/// One `sequence,species,group_<i>,<score>` line per sequence, groups in
/// descending score order and sequences sorted within each group. With a
/// non-empty `only_species`, sequences of other species are left out.
pub fn results_csv(session: &Session, result: &ClusterResult, only_species: &[String]) -> Result<String> {
    check_species_filter(session, only_species)?;
    let filter: BTreeSet<&str> = only_species.iter().map(String::as_str).collect();

    let mut lines = Vec::new();
    for (i, cluster) in result.clusters.iter().enumerate() {
        for sequence in &cluster.leaves {
            let species = session.species_of(sequence).ok_or_else(|| {
                MiphyError::runtime(format!("sequence \"{}\" has no species assignment", sequence))
            })?;
            if filter.is_empty() || filter.contains(species) {
                lines.push(format!("{},{},group_{},{}", sequence, species, i, display_score(cluster.score)));
            }
        }
    }
    Ok(lines.join("\n"))
}

/// Two decimals, without a sign on values that round to zero.
fn display_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0 + 0.0;
    format!("{:.2}", rounded)
}
