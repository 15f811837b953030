use super::{output_or_input, read_tree};
use crate::phylo::{midpoint_root, to_newick, NewickOptions, TreeFormat};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(tree: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let parsed = read_tree(&tree, TreeFormat::Newick)?;
    let rooted = midpoint_root(&parsed)?;

    let output = output_or_input(&tree, output, "nwk");
    fs::write(&output, to_newick(&rooted, NewickOptions::default()))
        .with_context(|| format!("Failed to write tree to {}", output.display()))?;
    println!("Midpoint-rooted tree saved to {}", output.display());
    Ok(())
}
