use super::types::{NodeId, ParsedTree};

#[derive(Debug, Clone, Copy, Default)]
pub struct NewickOptions {
    /// Write labels of internal nodes; synthetic names are never written.
    pub internal_names: bool,
}

/// Serializes the tree back to a `;`-terminated newick string.
pub fn to_newick(tree: &ParsedTree, options: NewickOptions) -> String {
    enum Step {
        Enter(NodeId),
        Separator,
        Exit(NodeId),
    }

    let mut out = String::new();
    let mut stack = vec![Step::Enter(tree.root())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let node = tree.node(id);
                if node.is_leaf() {
                    write_label(&mut out, tree, id, true);
                    continue;
                }
                out.push('(');
                stack.push(Step::Exit(id));
                for (i, &child) in node.children().iter().enumerate().rev() {
                    stack.push(Step::Enter(child));
                    if i > 0 {
                        stack.push(Step::Separator);
                    }
                }
            }
            Step::Separator => out.push(','),
            Step::Exit(id) => {
                out.push(')');
                write_label(&mut out, tree, id, options.internal_names);
            }
        }
    }
    out.push(';');
    out
}

fn write_label(out: &mut String, tree: &ParsedTree, id: NodeId, with_name: bool) {
    let node = tree.node(id);
    if with_name && !node.is_synthetic() {
        out.push_str(node.name());
    }
    if id != tree.root() {
        if let Some(length) = node.length {
            out.push(':');
            out.push_str(&length.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::newick::parse_newick;

    #[test]
    fn writes_lengths_and_drops_internal_labels() {
        let tree = parse_newick("((a:1,b:2)0.95:0.5,c:3)root;").unwrap();
        assert_eq!(to_newick(&tree, NewickOptions::default()), "((a:1,b:2):0.5,c:3);");
        let named = to_newick(&tree, NewickOptions { internal_names: true });
        assert_eq!(named, "((a:1,b:2)0.95:0.5,c:3)root;");
    }
}
