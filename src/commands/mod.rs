pub mod clean;
pub mod cluster;
pub mod coords;
pub mod info;
pub mod midpoint;
pub mod sweep;

use crate::cli::TreeInput;
use crate::clustering::ClusterOptions;
use crate::config::Config;
use crate::embedding::{compute_distances, embed, ensure_finite, load_if_current, save_embedding, Embedding};
use crate::info::InfoFile;
use crate::phylo::{to_newick, NewickOptions, ParsedTree, TreeFormat};
use crate::session::Session;
use crate::utils::logging::warn;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use crate::utils::{read_text, EmbeddingCache};
use crate::verbose;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn read_tree(path: &Path, format: TreeFormat) -> Result<ParsedTree> {
    let text = read_text(path).with_context(|| format!("Failed to read tree file {}", path.display()))?;
    Ok(format.parse(&text)?)
}

/// Parses the inputs, validates them against each other and attaches the
/// coordinates when the spread refinement is wanted.
pub(crate) fn open_session(input: &TreeInput, config: &Config, verbose: bool) -> Result<Session> {
    let tree = read_tree(&input.gene_tree, input.tree_format)?;
    verbose!(verbose, "parsed gene tree with {} sequences", tree.leaf_count());

    let info_text = read_text(&input.info_file)
        .with_context(|| format!("Failed to read information file {}", input.info_file.display()))?;
    let info = InfoFile::parse(&info_text)?;
    for warning in &info.warnings {
        warn(warning);
    }
    verbose!(verbose, "finished parsing the info file");

    let options = ClusterOptions {
        relative_average: input.relative_average.unwrap_or(config.relative_average),
        ..ClusterOptions::default()
    };
    let session = Session::new(tree, &info)?.with_options(options).with_verbose(verbose);
    for (quoted, plain) in session.renamed_leaves() {
        warn(format!("sequence {} was renamed to \"{}\" to match the information file", quoted, plain));
    }

    if input.no_coords {
        return Ok(session);
    }
    let max_dimensions = input.max_dimensions.unwrap_or(config.max_dimensions);
    let embedding = resolve_embedding(
        session.gene_tree(),
        input.coords_file.as_deref(),
        max_dimensions,
        config.cache_embeddings,
        verbose,
    )?;
    Ok(session.with_embedding(embedding)?)
}

/// Distance matrix and MDS with progress output.
pub(crate) fn compute_coordinates(tree: &ParsedTree, max_dimensions: usize) -> Result<Embedding> {
    let progress = ProgressBarBuilder::new(format!(
        "Generating distance matrix for {} sequences...",
        tree.leaf_count()
    ))
    .with_tick()
    .build()?;
    let distances = compute_distances(tree);
    ensure_finite(&distances)?;
    progress.set_message("Calculating coordinates...");
    let embedding = embed(&distances, max_dimensions);
    progress.finish_with_message(format!(
        "Coordinates found using {} dimensions",
        embedding.dims()
    ));
    Ok(embedding)
}

/// Coordinates from `coords_file`, the user cache, or a fresh computation,
/// in that order. Stale files are recomputed and overwritten.
pub fn resolve_embedding(
    tree: &ParsedTree,
    coords_file: Option<&Path>,
    max_dimensions: usize,
    use_cache: bool,
    verbose: bool,
) -> Result<Embedding> {
    let leaf_count = tree.leaf_count();

    if let Some(path) = coords_file {
        let stored = load_if_current(path, leaf_count)
            .with_context(|| format!("Failed to load coordinates from {}", path.display()))?;
        if let Some(embedding) = stored {
            verbose!(verbose, "loaded {} coordinates from {}", embedding.rows(), path.display());
            return Ok(embedding);
        }
        if path.exists() {
            warn(format!(
                "the coordinates in {} do not match the {} sequences of the gene tree; recalculating",
                path.display(),
                leaf_count
            ));
        }
        let embedding = compute_coordinates(tree, max_dimensions)?;
        save_embedding(&embedding, path)
            .with_context(|| format!("Failed to save coordinates to {}", path.display()))?;
        verbose!(verbose, "saved coordinates to {}", path.display());
        return Ok(embedding);
    }

    if use_cache {
        let cache = EmbeddingCache::new()?;
        let key_text = to_newick(tree, NewickOptions::default());
        if let Some(embedding) = cache.get(&key_text, max_dimensions, leaf_count) {
            verbose!(verbose, "coordinates retrieved from {}", cache.cache_dir().display());
            return Ok(embedding);
        }
        let embedding = compute_coordinates(tree, max_dimensions)?;
        let path = cache.put(&key_text, max_dimensions, &embedding)?;
        verbose!(verbose, "cached coordinates at {}", path.display());
        return Ok(embedding);
    }

    compute_coordinates(tree, max_dimensions)
}

/// `output`, or the input path itself when no output was given.
pub(crate) fn output_or_input(input: &Path, output: Option<PathBuf>, extension: &str) -> PathBuf {
    match output {
        Some(path) => with_extension(path, extension),
        None => input.to_path_buf(),
    }
}

/// Appends `.extension` unless the path already ends with it.
pub(crate) fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension);
    if path.to_string_lossy().ends_with(&suffix) {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(&suffix);
        PathBuf::from(name)
    }
}
