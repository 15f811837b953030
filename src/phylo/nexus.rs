use super::newick::parse_newick;
use super::types::ParsedTree;
use crate::error::{MiphyError, Result};
use std::collections::HashMap;

/// Reads the first tree of a NEXUS `TREES` block, applying its
/// `TRANSLATE` table to the leaf labels when present.
pub fn parse_nexus(text: &str) -> Result<ParsedTree> {
    let lowered = text.to_ascii_lowercase();
    if !lowered.trim_start().starts_with("#nexus") {
        return Err(MiphyError::parse("NEXUS data must start with '#NEXUS'"));
    }

    let block_start = lowered
        .find("begin trees;")
        .ok_or_else(|| MiphyError::parse("no 'BEGIN TREES;' block found in the NEXUS data"))?
        + "begin trees;".len();
    let block_end = lowered[block_start..]
        .find("end;")
        .map(|k| block_start + k)
        .unwrap_or(text.len());
    let block = strip_comments(&text[block_start..block_end]);

    let mut translate: HashMap<String, String> = HashMap::new();
    let mut newick: Option<String> = None;

    for statement in block.split(';') {
        let statement = statement.trim();
        let keyword = statement
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match keyword.as_str() {
            "translate" => {
                let pairs = &statement["translate".len()..];
                for entry in pairs.split(',') {
                    let mut fields = entry.split_whitespace();
                    if let (Some(key), Some(value)) = (fields.next(), fields.next()) {
                        translate.insert(key.to_string(), unquote(value).to_string());
                    }
                }
            }
            "tree" | "utree" => {
                let (_, definition) = statement.split_once('=').ok_or_else(|| {
                    MiphyError::parse("tree statement in the NEXUS data has no '='")
                })?;
                newick = Some(format!("{};", definition.trim()));
                break;
            }
            _ => {}
        }
    }

    let newick = newick.ok_or_else(|| MiphyError::parse("the NEXUS 'TREES' block contains no tree"))?;
    let tree = parse_newick(&newick)?;
    if translate.is_empty() {
        Ok(tree)
    } else {
        tree.rename_leaves(&translate)
    }
}

// NEXUS comments ([&R], [&U], annotations) are dropped before splitting statements.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_table_renames_leaves() {
        let text = "#NEXUS\nBEGIN TREES;\n  TRANSLATE\n    1 gene_a,\n    2 'gene_b',\n    3 gene_c;\n  TREE one = [&R] ((1:0.1,2:0.2):0.3,3:0.4);\nEND;\n";
        let tree = parse_nexus(text).unwrap();
        assert_eq!(tree.leaf_names(), vec!["gene_a", "gene_b", "gene_c"]);
    }

    #[test]
    fn missing_trees_block_is_an_error() {
        assert!(parse_nexus("#NEXUS\nBEGIN TAXA;\nEND;").is_err());
    }
}
