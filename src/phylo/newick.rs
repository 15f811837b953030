use super::types::{NodeId, ParsedTree, TreeNode};
use crate::error::{MiphyError, Result};
use std::collections::HashSet;

// Wraps the arena id of an already contracted group inside the working string.
const CONTRACTED: char = '\u{1}';

struct RawNode {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    length: Option<f64>,
    leaf: bool,
}

/// Parses a bracketed newick string.
///
/// Works by repeatedly contracting the innermost group `(x,y)label:len`
/// into a single token until only the root group is left. Internal nodes
/// without a label, or whose label collides with another node, get a
/// synthetic `<label>_<n>` name; leaves with an empty name get `leaf_<n>`.
/// Multifurcations are accepted here, see
/// [`ensure_bifurcating`](super::validation::ensure_bifurcating).
pub fn parse_newick(text: &str) -> Result<ParsedTree> {
    let body = sanitize(text)?;
    if body.is_empty() {
        return Err(MiphyError::parse("the tree string is empty"));
    }

    let mut raw: Vec<RawNode> = Vec::new();

    if !body.contains('(') {
        if body.contains(')') || body.contains(',') {
            return Err(MiphyError::parse("unbalanced brackets: ')' without a matching '('"));
        }
        let (label, length) = split_label(&body)?;
        raw.push(RawNode {
            label,
            parent: None,
            children: Vec::new(),
            length,
            leaf: true,
        });
        return finish(raw, 0);
    }

    let root_label = match body.rfind(')') {
        Some(last) => split_label(&body[last + 1..])?.0,
        None => String::new(),
    };

    let mut remaining = body;
    let root = loop {
        let close = remaining
            .find(')')
            .ok_or_else(|| MiphyError::parse("unbalanced brackets: missing ')'"))?;
        let open = remaining[..close]
            .rfind('(')
            .ok_or_else(|| MiphyError::parse("unbalanced brackets: ')' without a matching '('"))?;
        let is_root = !remaining[..open].contains('(');

        let group = raw.len();
        raw.push(RawNode {
            label: String::new(),
            parent: None,
            children: Vec::new(),
            length: None,
            leaf: false,
        });
        for datum in remaining[open + 1..close].split(',') {
            let child = parse_child(datum, &mut raw)?;
            raw[child].parent = Some(group);
            raw[group].children.push(child);
        }

        if is_root {
            if remaining[close + 1..].contains(['(', ')', ',']) {
                return Err(MiphyError::parse("unexpected text after the root group"));
            }
            raw[group].label = root_label;
            break group;
        }

        let label_end = remaining[close + 1..]
            .find([':', ',', ')'])
            .map(|k| close + 1 + k)
            .unwrap_or(remaining.len());
        raw[group].label = remaining[close + 1..label_end].trim().to_string();
        remaining = format!(
            "{}{CONTRACTED}{group}{CONTRACTED}{}",
            &remaining[..open],
            &remaining[label_end..]
        );
    };

    finish(raw, root)
}

/// Strips bracket comments, line breaks and everything from the first `;`.
fn sanitize(text: &str) -> Result<String> {
    if text.contains(CONTRACTED) {
        return Err(MiphyError::parse("the tree contains control characters"));
    }
    let mut out = String::with_capacity(text.len());
    let mut in_comment = false;
    for c in text.chars() {
        match c {
            '[' if !in_comment => in_comment = true,
            ']' if in_comment => in_comment = false,
            _ if in_comment => {}
            ';' => break,
            '\n' | '\r' | '\t' => {}
            _ => out.push(c),
        }
    }
    if in_comment {
        return Err(MiphyError::parse("unterminated '[' comment"));
    }
    Ok(out.trim().to_string())
}

fn split_label(datum: &str) -> Result<(String, Option<f64>)> {
    match datum.split_once(':') {
        Some((name, length)) => Ok((name.trim().to_string(), parse_length(length)?)),
        None => Ok((datum.trim().to_string(), None)),
    }
}

fn parse_length(text: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| MiphyError::parse(format!("invalid branch length \"{}\"", text)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(MiphyError::validation(format!(
            "branch lengths must be non-negative numbers, found \"{}\"",
            text
        )));
    }
    Ok(Some(value))
}

fn parse_child(datum: &str, raw: &mut Vec<RawNode>) -> Result<NodeId> {
    let (label, length) = split_label(datum)?;

    if let Some(inner) = label.strip_prefix(CONTRACTED).and_then(|l| l.strip_suffix(CONTRACTED)) {
        let id: NodeId = inner
            .parse()
            .map_err(|_| MiphyError::parse("corrupted group token"))?;
        if id >= raw.len() || raw[id].parent.is_some() {
            return Err(MiphyError::parse("corrupted group token"));
        }
        raw[id].length = length;
        return Ok(id);
    }
    if label.contains(CONTRACTED) {
        return Err(MiphyError::parse(format!(
            "missing ',' between sibling groups near \"{}\"",
            label.replace(CONTRACTED, "")
        )));
    }

    raw.push(RawNode {
        label,
        parent: None,
        children: Vec::new(),
        length,
        leaf: true,
    });
    Ok(raw.len() - 1)
}

fn finish(raw: Vec<RawNode>, root: NodeId) -> Result<ParsedTree> {
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut names: Vec<Option<(String, bool)>> = vec![None; raw.len()];
    let mut counter = 0usize;

    for (id, node) in raw.iter().enumerate().filter(|(_, n)| n.leaf) {
        if node.label.is_empty() {
            continue;
        }
        if !taken.insert(node.label.clone()) {
            return Err(MiphyError::validation(format!(
                "multiple sequences named \"{}\" were found in the tree",
                node.label
            )));
        }
        names[id] = Some((node.label.clone(), false));
    }
    for (id, _) in raw.iter().enumerate().filter(|(_, n)| n.leaf && n.label.is_empty()) {
        names[id] = Some((unique_name("leaf", &mut counter, &mut taken), true));
    }
    for (id, node) in raw.iter().enumerate().filter(|(_, n)| !n.leaf) {
        let name = if id == root && node.label.is_empty() && taken.insert("root".to_string()) {
            ("root".to_string(), false)
        } else if node.label.is_empty() {
            (unique_name("node", &mut counter, &mut taken), true)
        } else if taken.insert(node.label.clone()) {
            (node.label.clone(), false)
        } else {
            (unique_name(&node.label, &mut counter, &mut taken), true)
        };
        names[id] = Some(name);
    }

    let nodes = raw
        .into_iter()
        .zip(names)
        .map(|(node, name)| {
            let (name, synthetic) = name.ok_or_else(|| MiphyError::parse("unnamed node after parsing"))?;
            Ok(TreeNode {
                name,
                parent: node.parent,
                children: node.children,
                length: node.length,
                synthetic,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ParsedTree::from_nodes(nodes, root)
}

fn unique_name(base: &str, counter: &mut usize, taken: &mut HashSet<String>) -> String {
    loop {
        let candidate = format!("{}_{}", base, counter);
        *counter += 1;
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
}
