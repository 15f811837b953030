use miphy_tools::phylo::{
    ensure_bifurcating, midpoint_root, parse_newick, to_newick, NewickOptions, TreeFormat, DEFAULT_BRANCH_LENGTH,
};
use miphy_tools::{parse, ErrorCategory};

#[test]
fn leaves_are_sorted_and_paths_start_at_the_root() {
    let tree = parse("((c:1,a:2)x:3,b:4);").expect("parse");
    assert_eq!(tree.leaf_names(), vec!["a", "b", "c"]);
    assert_eq!(tree.root_name(), "root");
    assert_eq!(tree.path_names(tree.id("a").unwrap()), vec!["root", "x", "a"]);
    assert_eq!(tree.edge_weight("x", "a"), Some(2.0));
    assert_eq!(tree.edge_weight("root", "x"), Some(3.0));
    assert_eq!(tree.edge_weight("root", "a"), None);
    assert_eq!(tree.parent_map()["c"], "x");
}

#[test]
fn missing_lengths_use_the_default_weight() {
    let tree = parse("((a,b),c);").expect("parse");
    let internal = tree.parent_map()["a"].to_string();
    assert_eq!(tree.edge_weight(&internal, "a"), Some(DEFAULT_BRANCH_LENGTH));
    assert_eq!(tree.edge_weight("root", "c"), Some(DEFAULT_BRANCH_LENGTH));
    assert_eq!(tree.edges().count(), 4);
}

#[test]
fn synthetic_names_for_unnamed_and_colliding_nodes() {
    let tree = parse("((a,b),(c,));").expect("parse");
    assert_eq!(tree.leaf_count(), 4);
    assert!(tree.leaf_names().iter().any(|n| n.starts_with("leaf_")));

    // an internal label equal to a leaf name is disambiguated
    let tree = parse("((a,b)a,c);").expect("parse");
    let internal = tree.parent_map()["b"];
    assert_ne!(internal, "a");
    assert!(internal.starts_with("a_"), "{}", internal);
    assert!(tree.node(tree.id(internal).unwrap()).is_synthetic());
}

#[test]
fn malformed_trees_are_rejected() {
    for bad in ["((a,b),c;", "(a,b));", "", "((a,b)c(d,e));", "(a:x,b);"] {
        let err = parse_newick(bad).expect_err(bad);
        assert_eq!(err.category(), ErrorCategory::Validation, "{}: {}", bad, err);
    }

    let err = parse("((a,b),a);").expect_err("duplicate leaves");
    assert!(err.to_string().contains("\"a\""), "{}", err);

    let err = parse("((a:-1,b),c);").expect_err("negative length");
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[test]
fn bifurcation_check() {
    assert!(ensure_bifurcating(&parse("((a,b),c);").unwrap()).is_ok());
    assert!(ensure_bifurcating(&parse("(a,b,c);").unwrap()).is_err());
    assert!(ensure_bifurcating(&parse("a;").unwrap()).is_err());
}

#[test]
fn writes_back_without_internal_names() {
    let text = "((a:1,b:2)n1:0.5,c:3);";
    let tree = parse(text).expect("parse");
    assert_eq!(to_newick(&tree, NewickOptions::default()), "((a:1,b:2):0.5,c:3);");
    let again = parse(&to_newick(&tree, NewickOptions { internal_names: true })).expect("reparse");
    assert_eq!(again.leaf_names(), tree.leaf_names());
    assert_eq!(again.edge_weight("n1", "b"), Some(2.0));
}

#[test]
fn format_detection() {
    let nexus = "#NEXUS\nbegin trees;\n translate 1 alpha, 2 beta, 3 gamma;\n tree t1 = [&U] ((1,2),3);\nend;\n";
    assert_eq!(TreeFormat::detect(nexus).unwrap(), TreeFormat::Nexus);
    assert_eq!(TreeFormat::detect("((a,b),c);").unwrap(), TreeFormat::Newick);
    assert!(TreeFormat::detect("<phyloxml></phyloxml>").is_err());

    let tree = parse(nexus).expect("nexus");
    assert_eq!(tree.leaf_names(), vec!["alpha", "beta", "gamma"]);

    assert_eq!("e".parse::<TreeFormat>().unwrap(), TreeFormat::Nexus);
    assert_eq!("n".parse::<TreeFormat>().unwrap(), TreeFormat::Newick);
    assert!("p".parse::<TreeFormat>().is_err());
    assert!("q".parse::<TreeFormat>().is_err());
}

#[test]
fn midpoint_rooting_keeps_the_tree_binary() {
    let tree = parse("(((a:1,b:1):1,c:2):1,d:10);").expect("parse");
    let rooted = midpoint_root(&tree).expect("midpoint");

    assert_eq!(rooted.leaf_names(), tree.leaf_names());
    ensure_bifurcating(&rooted).expect("still binary");
    // longest path a..d is 13; d hangs 6.5 below the new root
    assert_eq!(rooted.edge_weight(rooted.root_name(), "d"), Some(6.5));
}
