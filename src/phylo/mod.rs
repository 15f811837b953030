pub mod midpoint;
pub mod newick;
pub mod nexus;
pub mod types;
pub mod validation;
pub mod writer;

use crate::error::{MiphyError, Result};
use std::fmt;
use std::str::FromStr;

pub use midpoint::midpoint_root;
pub use newick::parse_newick;
pub use nexus::parse_nexus;
pub use types::{NodeId, ParsedTree, TreeNode, DEFAULT_BRANCH_LENGTH};
pub use validation::{clean_leaf_names, clean_name, ensure_bifurcating};
pub use writer::{to_newick, NewickOptions};

/// Supported gene tree input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    /// Sniff the format from the text.
    #[default]
    Auto,
    Newick,
    Nexus,
}

impl TreeFormat {
    pub fn parse(self, text: &str) -> Result<ParsedTree> {
        match self {
            TreeFormat::Auto => TreeFormat::detect(text)?.parse(text),
            TreeFormat::Newick => parse_newick(text),
            TreeFormat::Nexus => parse_nexus(text),
        }
    }

    pub fn detect(text: &str) -> Result<TreeFormat> {
        let head = text.trim_start();
        if head.get(..6).is_some_and(|h| h.eq_ignore_ascii_case("#nexus")) {
            Ok(TreeFormat::Nexus)
        } else if head.starts_with('<') {
            Err(MiphyError::validation(
                "XML tree formats (PhyloXML, NeXML) are not supported; convert the tree to Newick or NEXUS",
            ))
        } else {
            Ok(TreeFormat::Newick)
        }
    }
}

impl FromStr for TreeFormat {
    type Err = MiphyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "auto" => Ok(TreeFormat::Auto),
            "n" | "newick" => Ok(TreeFormat::Newick),
            "e" | "nexus" => Ok(TreeFormat::Nexus),
            "p" | "phyloxml" | "x" | "nexml" => Err(MiphyError::validation(format!(
                "the tree format \"{}\" is not supported; use a (auto-detect), n (Newick) or e (NEXUS)",
                s
            ))),
            other => Err(MiphyError::validation(format!(
                "unknown tree format \"{}\"; must be one of: a (auto-detect), n (Newick) or e (NEXUS)",
                other
            ))),
        }
    }
}

impl fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeFormat::Auto => "auto",
            TreeFormat::Newick => "newick",
            TreeFormat::Nexus => "nexus",
        };
        f.write_str(name)
    }
}

/// Parses a gene tree in any supported format.
pub fn parse(text: &str) -> Result<ParsedTree> {
    TreeFormat::Auto.parse(text)
}
