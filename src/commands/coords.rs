use super::{compute_coordinates, read_tree};
use crate::embedding::save_embedding;
use crate::phylo::TreeFormat;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(tree: PathBuf, output: PathBuf, format: TreeFormat, max_dimensions: usize) -> Result<()> {
    let parsed = read_tree(&tree, format)?;
    println!("Parsed tree with {} terminal nodes.", parsed.leaf_count());

    let embedding = compute_coordinates(&parsed, max_dimensions)?;
    save_embedding(&embedding, &output)
        .with_context(|| format!("Failed to save coordinates to {}", output.display()))?;
    println!(
        "Saved {} x {} coordinates to {}",
        embedding.rows(),
        embedding.dims(),
        output.display()
    );
    Ok(())
}
