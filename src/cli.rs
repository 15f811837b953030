use crate::clustering::{RelativeAverage, Weights};
use crate::phylo::TreeFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Print checkpoint messages (also enabled by MIPHY_VERBOSE=1)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that cluster a gene tree.
#[derive(ClapArgs, Debug, Clone)]
pub struct TreeInput {
    /// Gene tree file (plain or compressed)
    pub gene_tree: PathBuf,

    /// Information file with the species tree and species assignments
    pub info_file: PathBuf,

    /// Gene tree format: a (auto-detect), n (Newick) or e (NEXUS)
    #[arg(short = 'f', long, default_value = "a")]
    pub tree_format: TreeFormat,

    /// Skip the coordinate embedding; the spread weight is then ignored
    #[arg(short = 'n', long, conflicts_with = "coords_file")]
    pub no_coords: bool,

    /// Load the coordinates from this file if it exists, otherwise compute and save them
    #[arg(short = 'c', long)]
    pub coords_file: Option<PathBuf>,

    /// Maximum number of embedding dimensions (0 keeps all of them)
    #[arg(long)]
    pub max_dimensions: Option<usize>,

    /// How the baseline spread is averaged: median or mean
    #[arg(long)]
    pub relative_average: Option<RelativeAverage>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster a gene tree into minimum instability groups
    Cluster {
        #[command(flatten)]
        input: TreeInput,

        /// Cost of an incongruence event
        #[arg(short = 'i', long)]
        inc_weight: Option<f64>,

        /// Cost of a duplication event
        #[arg(short = 'd', long = "duplication-weight")]
        dup_weight: Option<f64>,

        /// Cost of a gene loss event
        #[arg(short = 'l', long)]
        loss_weight: Option<f64>,

        /// Weight given to the spread of a group
        #[arg(short = 's', long)]
        spread_weight: Option<f64>,

        /// Save the groups and instability scores as CSV to this file
        #[arg(short = 'r', long)]
        results_file: Option<PathBuf>,

        /// Comma-separated species to keep in the results file
        #[arg(short = 'o', long, value_delimiter = ',', requires = "results_file")]
        only_species: Vec<String>,

        /// Also save the results as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Cluster one gene tree under several weight settings in parallel
    Sweep {
        #[command(flatten)]
        input: TreeInput,

        /// Weights as INC,DUP,LOSS,SPREAD; repeat for each setting
        #[arg(short = 'w', long = "weights", required = true)]
        weights: Vec<Weights>,

        /// Number of worker threads
        #[arg(short = 't', long)]
        threads: Option<usize>,

        /// Save every result as a JSON array to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Compute the leaf coordinates of a tree and save them
    Coords {
        /// Gene tree file
        tree: PathBuf,
        /// Output coordinates file
        output: PathBuf,
        /// Gene tree format: a (auto-detect), n (Newick) or e (NEXUS)
        #[arg(short = 'f', long, default_value = "a")]
        tree_format: TreeFormat,
        /// Maximum number of dimensions (0 keeps all of them)
        #[arg(long)]
        max_dimensions: Option<usize>,
    },

    /// Write an information file grouping sequences by name prefix
    Info {
        /// Gene tree in newick format
        tree: PathBuf,
        /// Number of leading characters that identify a species
        prefix_size: usize,
        /// Output information file (".txt" is appended when missing)
        output: PathBuf,
    },

    /// Check that a tree is binary and rewrite it without internal names
    Clean {
        /// Gene tree in newick format
        tree: PathBuf,
        /// Output file; the input is overwritten when omitted
        output: Option<PathBuf>,
    },

    /// Re-root a tree at the midpoint of its longest leaf-to-leaf path
    Midpoint {
        /// Gene tree in newick format
        tree: PathBuf,
        /// Output file; the input is overwritten when omitted
        output: Option<PathBuf>,
    },
}
