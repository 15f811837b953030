pub mod cli;
pub mod clustering;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod error;
pub mod export;
pub mod info;
pub mod phylo;
pub mod session;
pub mod utils;

// Re-export main API
pub use clustering::{cluster, Cluster, ClusterResult, Clusterer, SpeciesMap, SpeciesTree, Weights};
pub use embedding::{compute_embedding, Embedding};
pub use error::{ErrorCategory, MiphyError, Result};
pub use info::InfoFile;
pub use phylo::{parse, ParsedTree, TreeFormat};
pub use session::Session;
