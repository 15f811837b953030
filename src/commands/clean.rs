use super::{output_or_input, read_tree};
use crate::phylo::{clean_leaf_names, ensure_bifurcating, to_newick, NewickOptions, TreeFormat};
use crate::utils::logging::warn;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(tree: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let parsed = read_tree(&tree, TreeFormat::Newick)?;
    ensure_bifurcating(&parsed)?;
    let (parsed, renamed) = clean_leaf_names(parsed)?;
    for (old, new) in &renamed {
        warn(format!("sequence \"{}\" was renamed to \"{}\"", old, new));
    }

    let output = output_or_input(&tree, output, "nwk");
    fs::write(&output, to_newick(&parsed, NewickOptions::default()))
        .with_context(|| format!("Failed to write tree to {}", output.display()))?;
    println!("Cleaned tree with {} sequences saved to {}", parsed.leaf_count(), output.display());
    Ok(())
}
