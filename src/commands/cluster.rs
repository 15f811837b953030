use super::open_session;
use crate::cli::TreeInput;
use crate::clustering::{ClusterResult, Weights};
use crate::config::Config;
use crate::export::{check_species_filter, results_csv, ResultsExport};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(
    input: TreeInput,
    mut weights: Weights,
    results_file: Option<PathBuf>,
    only_species: Vec<String>,
    json: Option<PathBuf>,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    if input.no_coords {
        weights.spread = 0.0;
    }
    let session = open_session(&input, config, verbose)?;
    check_species_filter(&session, &only_species)?;

    let progress = ProgressBarBuilder::new(format!(
        "Clustering {} sequences with weights {}...",
        session.gene_tree().leaf_count(),
        weights
    ))
    .with_tick()
    .build()?;
    let result = session.process(&weights)?;
    progress.finish_with_message(format!("Found {} groups", result.clusters.len()));

    if let Some(path) = &results_file {
        let csv = results_csv(&session, &result, &only_species)?;
        fs::write(path, csv).with_context(|| format!("Failed to write results to {}", path.display()))?;
        println!("Instability scores saved to {}", path.display());
    } else {
        print_groups(&result);
    }

    if let Some(path) = &json {
        let export = ResultsExport::new(&result);
        fs::write(path, export.to_json()?).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results saved as JSON to {}", path.display());
    }

    session.consume()?;
    Ok(())
}

pub(crate) fn print_groups(result: &ClusterResult) {
    println!(
        "{:<10} {:>9} {:>6} {:>5} {:>5} {:>5} {:>8}  Sequences",
        "Group", "Score", "Size", "Dup", "Inc", "Loss", "Spread"
    );
    for (i, cluster) in result.clusters.iter().enumerate() {
        let spread = cluster
            .events
            .spread
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>9.2} {:>6} {:>5} {:>5} {:>5} {:>8}  {}",
            format!("group_{}", i),
            cluster.score,
            cluster.len(),
            cluster.events.duplications,
            cluster.events.incongruences,
            cluster.events.losses,
            spread,
            cluster.leaves.join(",")
        );
    }
}
