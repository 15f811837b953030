use super::{read_tree, with_extension};
use crate::info::{group_by_prefix, render_info};
use crate::phylo::TreeFormat;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(tree: PathBuf, prefix_size: usize, output: PathBuf) -> Result<()> {
    if prefix_size == 0 {
        bail!("PREFIX_SIZE must be at least 1");
    }
    let parsed = read_tree(&tree, TreeFormat::Newick)?;
    let groups = group_by_prefix(parsed.leaf_names(), prefix_size);

    let output = with_extension(output, "txt");
    fs::write(&output, render_info(&groups))
        .with_context(|| format!("Failed to write information file {}", output.display()))?;
    println!(
        "Wrote info file for {} genes from {} groups to \"{}\"",
        parsed.leaf_count(),
        groups.len(),
        output.display()
    );
    Ok(())
}
