use super::open_session;
use crate::cli::TreeInput;
use crate::clustering::Weights;
use crate::config::Config;
use crate::export::ResultsExport;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(
    input: TreeInput,
    mut weights: Vec<Weights>,
    threads: usize,
    json: Option<PathBuf>,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    if input.no_coords {
        weights.iter_mut().for_each(|w| w.spread = 0.0);
    }
    let session = open_session(&input, config, verbose)?;

    let progress = ProgressBarBuilder::new(format!(
        "Clustering {} weight settings on {} threads...",
        weights.len(),
        threads
    ))
    .with_template("{spinner:.green} [{elapsed_precise}] {msg}")
    .with_tick()
    .build()?;
    let results = session.sweep(&weights, threads)?;
    progress.finish_with_message(format!("Clustered {} weight settings", results.len()));

    println!("{:<24} {:>7} {:>10} {:>8}", "Weights", "Groups", "Top score", "Refined");
    for result in &results {
        let top = result.clusters.first().map(|c| c.score).unwrap_or(0.0);
        println!(
            "{:<24} {:>7} {:>10.2} {:>8}",
            result.weights.to_string(),
            result.clusters.len(),
            top,
            result.refined
        );
    }

    if let Some(path) = &json {
        let exports: Vec<ResultsExport> = results.iter().map(|r| ResultsExport::new(r)).collect();
        fs::write(path, serde_json::to_string_pretty(&exports)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results saved as JSON to {}", path.display());
    }
    Ok(())
}
