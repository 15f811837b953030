use super::types::ParsedTree;
use crate::error::{MiphyError, Result};
use std::collections::HashMap;

/// Gene trees must be strictly bifurcating; multifurcations are rejected,
/// never resolved.
pub fn ensure_bifurcating(tree: &ParsedTree) -> Result<()> {
    if tree.leaf_count() < 2 {
        return Err(MiphyError::validation("the gene tree must contain at least 2 sequences"));
    }
    for (_, node) in tree.nodes() {
        let count = node.children().len();
        if count != 0 && count != 2 {
            return Err(MiphyError::validation(format!(
                "the gene tree must be binary, but node \"{}\" has {} children",
                node.name(),
                count
            )));
        }
    }
    Ok(())
}

/// Characters that cannot appear unquoted in a newick label.
pub const FORBIDDEN_NAME_CHARS: [char; 9] = ['(', ')', '[', ']', ':', ';', ',', '\'', '"'];

/// Replaces forbidden characters and whitespace with `_`.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Cleans every leaf name, returning the tree and the `(old, new)` renames.
/// Two leaves that clean to the same name are a validation error.
pub fn clean_leaf_names(tree: ParsedTree) -> Result<(ParsedTree, Vec<(String, String)>)> {
    let renames: Vec<(String, String)> = tree
        .leaf_names()
        .into_iter()
        .filter_map(|name| {
            let cleaned = clean_name(name);
            (cleaned != name).then(|| (name.to_string(), cleaned))
        })
        .collect();
    if renames.is_empty() {
        return Ok((tree, renames));
    }
    let table: HashMap<String, String> = renames.iter().cloned().collect();
    Ok((tree.rename_leaves(&table)?, renames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::parse_newick;

    #[test]
    fn names_lose_forbidden_characters() {
        assert_eq!(clean_name("gene 1"), "gene_1");
        assert_eq!(clean_name("'quoted'"), "_quoted_");
        assert_eq!(clean_name("plain.name-2"), "plain.name-2");
    }

    #[test]
    fn colliding_clean_names_are_rejected() {
        let tree = parse_newick("(a b,a_b);").unwrap();
        let err = clean_leaf_names(tree).unwrap_err();
        assert!(err.to_string().contains("a_b"), "{}", err);
    }
}
