use miphy_tools::clustering::{ClusterOptions, Clusterer, RelativeAverage, SpeciesMap, SpeciesTree, Weights};
use miphy_tools::{cluster, compute_embedding, parse, ErrorCategory};
use std::collections::BTreeSet;

// Hand-reconciled fixtures. Gene tree ((a1,b1),(a2,b2)) against species tree (A,B):
// - every leaf misses one species: m = 1, score = loss weight
// - (a1,b1) and (a2,b2) are speciations with no missing species: score 0, merged
// - the root joins {A,B} with {A,B}: one duplication, no losses; with a duplication
//   weight of 1 the combined score (1) loses to the separate score (0 + 0)

fn mapping(pairs: &[(&str, &str)]) -> SpeciesMap {
    pairs
        .iter()
        .map(|(gene, species)| (gene.to_string(), species.to_string()))
        .collect()
}

fn duplicated_pair() -> (miphy_tools::ParsedTree, SpeciesTree, SpeciesMap) {
    let gene = parse("((a1:1,b1:1):1,(a2:1,b2:1):1);").expect("parse gene tree");
    let species = SpeciesTree::parse("(A,B);").expect("parse species tree");
    let map = mapping(&[("a1", "A"), ("a2", "A"), ("b1", "B"), ("b2", "B")]);
    (gene, species, map)
}

fn unit_weights() -> Weights {
    Weights::new(1.0, 1.0, 1.0, 1.0).expect("valid weights")
}

fn assert_partition(gene: &miphy_tools::ParsedTree, result: &miphy_tools::ClusterResult) {
    let mut seen = BTreeSet::new();
    for cluster in &result.clusters {
        assert!(!cluster.is_empty(), "empty cluster rooted at {}", cluster.root);
        for leaf in &cluster.leaves {
            assert!(seen.insert(leaf.clone()), "{} appears in more than one cluster", leaf);
        }
    }
    let all: BTreeSet<String> = gene.leaf_names().into_iter().map(String::from).collect();
    assert_eq!(seen, all, "clusters must cover every sequence exactly once");
}

#[test]
fn duplicated_pair_root_events() {
    let (gene, species, map) = duplicated_pair();
    let clusterer = Clusterer::new(gene, species, &map).expect("valid inputs");
    let table = clusterer.first_pass(&unit_weights()).expect("first pass");
    let root = table.root_record().expect("root scored");

    assert_eq!(root.duplications, 1);
    assert_eq!(root.incongruences, 0);
    assert_eq!(root.losses, 0);
    assert_eq!(root.baseline_losses, 0);
    assert!(!root.merged, "root should be split");
}

#[test]
fn duplicated_pair_splits_into_two_groups() {
    let (gene, species, map) = duplicated_pair();
    let result = cluster(&gene, &species, &map, &unit_weights(), None).expect("cluster");

    assert!(!result.refined);
    assert_eq!(result.clusters.len(), 2);
    assert_eq!(result.clusters[0].leaves, vec!["a1", "b1"]);
    assert_eq!(result.clusters[1].leaves, vec!["a2", "b2"]);
    for cluster in &result.clusters {
        assert_eq!(cluster.score, 0.0);
        assert_eq!(cluster.events.duplications, 0);
        assert_eq!(cluster.events.incongruences, 0);
        assert_eq!(cluster.events.losses, 0);
        assert_eq!(cluster.events.spread, None);
    }
    assert_partition(&gene, &result);
}

#[test]
fn zero_weights_give_one_group() {
    let (gene, species, map) = duplicated_pair();
    let weights = Weights::new(0.0, 0.0, 0.0, 0.0).expect("valid weights");
    let result = cluster(&gene, &species, &map, &weights, None).expect("cluster");

    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].len(), 4);
    assert_eq!(result.clusters[0].root, "root");
    assert_eq!(result.clusters[0].score, 0.0);
}

#[test]
fn raising_the_duplication_weight_never_merges_groups() {
    let (gene, species, map) = duplicated_pair();
    let clusterer = Clusterer::new(gene, species, &map).expect("valid inputs");

    let mut previous = 0;
    for dup in [0.0, 0.5, 1.0, 2.0, 5.0] {
        let weights = Weights::new(1.0, dup, 1.0, 0.0).expect("valid weights");
        let count = clusterer.cluster(&weights, None).expect("cluster").clusters.len();
        assert!(count >= previous, "dup weight {} gave {} groups after {}", dup, count, previous);
        previous = count;
    }
    assert_eq!(previous, 2);
}

#[test]
fn ancestral_lineage_is_incongruent() {
    let gene = parse("((a,c),b);").expect("parse gene tree");
    let species = SpeciesTree::parse("((A,B),C);").expect("parse species tree");
    let map = mapping(&[("a", "A"), ("b", "B"), ("c", "C")]);
    let clusterer = Clusterer::new(gene, species, &map).expect("valid inputs");

    let table = clusterer.first_pass(&unit_weights()).expect("first pass");
    let root = table.root_record().expect("root scored");
    assert_eq!(root.incongruences, 1);
    assert_eq!(root.duplications, 0);
}

#[test]
fn loss_counts() {
    let species = SpeciesTree::parse("(A,(B,C));").expect("parse species tree");
    assert_eq!(species.loss_count(&["A"], &["B", "C"]).unwrap(), 1);
    assert_eq!(species.loss_count(&["A"], &["B"]).unwrap(), 1);
    assert_eq!(species.loss_count(&["B"], &["A", "C"]).unwrap(), 2);
    assert_eq!(species.loss_count(&["A"], &[]).unwrap(), 0);
    assert!(species.loss_count(&["Z"], &["A"]).is_err());
}

#[test]
fn ties_merge() {
    // (a1,a2) both in A: leaves score 1 each; the root adds one duplication and
    // keeps the single missing species, so combined = 1 + 1 = separate = 2.
    let gene = parse("(a1,a2);").expect("parse gene tree");
    let species = SpeciesTree::parse("(A,B);").expect("parse species tree");
    let map = mapping(&[("a1", "A"), ("a2", "A")]);

    let result = cluster(&gene, &species, &map, &unit_weights(), None).expect("cluster");
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].score, 2.0);
    assert_eq!(result.clusters[0].events.duplications, 1);
    assert_eq!(result.clusters[0].events.losses, 1);
}

#[test]
fn spread_refinement_runs_with_coordinates() {
    let (gene, species, map) = duplicated_pair();
    let embedding = compute_embedding(&gene, 0).expect("coordinates");
    let result = cluster(&gene, &species, &map, &unit_weights(), Some(&embedding)).expect("cluster");

    assert!(result.refined);
    assert_eq!(result.clusters.len(), 2);
    for cluster in &result.clusters {
        let spread = cluster.events.spread.expect("pairs merged during refinement");
        assert!(spread.abs() < 1e-9, "equal pairs should match the baseline, got {}", spread);
        assert!(cluster.score.abs() < 1e-9);
    }
    assert_partition(&gene, &result);
}

#[test]
fn refinement_is_skipped_without_multi_sequence_groups() {
    let gene = parse("(a1:1,a2:1);").expect("parse gene tree");
    let species = SpeciesTree::parse("(A,B);").expect("parse species tree");
    let map = mapping(&[("a1", "A"), ("a2", "A")]);
    let embedding = compute_embedding(&gene, 0).expect("coordinates");
    let weights = Weights::new(0.5, 2.0, 1.0, 1.0).expect("valid weights");

    let result = cluster(&gene, &species, &map, &weights, Some(&embedding)).expect("cluster");
    assert!(!result.refined);
    assert_eq!(result.clusters.len(), 2);
}

#[test]
fn larger_tree_is_partitioned_under_both_averages() {
    let gene = parse(
        "(((h1:0.2,m1:0.3):0.1,(h2:0.25,m2:0.2):0.4):0.3,((h3:0.1,z1:0.9):0.2,(m3:0.3,(z2:0.4,z3:0.1):0.2):0.5):0.3);",
    )
    .expect("parse gene tree");
    let species = SpeciesTree::parse("((H,M),Z);").expect("parse species tree");
    let map = mapping(&[
        ("h1", "H"),
        ("h2", "H"),
        ("h3", "H"),
        ("m1", "M"),
        ("m2", "M"),
        ("m3", "M"),
        ("z1", "Z"),
        ("z2", "Z"),
        ("z3", "Z"),
    ]);
    let embedding = compute_embedding(&gene, 0).expect("coordinates");

    for average in [RelativeAverage::Median, RelativeAverage::Mean] {
        let clusterer = Clusterer::new(gene.clone(), species.clone(), &map)
            .expect("valid inputs")
            .with_options(ClusterOptions {
                relative_average: average,
                ..ClusterOptions::default()
            });
        let result = clusterer.cluster(&Weights::default(), Some(&embedding)).expect("cluster");
        assert_partition(&gene, &result);
        let scores: Vec<f64> = result.clusters.iter().map(|c| c.score).collect();
        assert!(
            scores.windows(2).all(|w| w[0] >= w[1]),
            "clusters must be sorted by descending score: {:?}",
            scores
        );
        assert_eq!(result.scores().len(), 9);
    }
}

#[test]
fn validation_failures() {
    let species = SpeciesTree::parse("(A,B);").expect("parse species tree");

    let unmapped = parse("(a1,b9);").unwrap();
    let err = Clusterer::new(unmapped, species.clone(), &mapping(&[("a1", "A")])).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.to_string().contains("b9"), "{}", err);

    let non_binary = parse("(a1,b1,a2);").unwrap();
    let map = mapping(&[("a1", "A"), ("a2", "A"), ("b1", "B")]);
    let err = Clusterer::new(non_binary, species.clone(), &map).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    let gene = parse("(a1,c1);").unwrap();
    let err = Clusterer::new(gene, species, &mapping(&[("a1", "A"), ("c1", "C")])).unwrap_err();
    assert!(err.to_string().contains("\"C\""), "{}", err);

    assert!(Weights::new(-1.0, 1.0, 1.0, 1.0).is_err());
    assert!(Weights::new(1.0, f64::NAN, 1.0, 1.0).is_err());
}

#[test]
fn mismatched_coordinates_are_rejected() {
    let (gene, species, map) = duplicated_pair();
    let other = parse("((a1:1,b1:1):1,a2:1);").unwrap();
    let embedding = compute_embedding(&other, 0).expect("coordinates");
    let err = cluster(&gene, &species, &map, &unit_weights(), Some(&embedding)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
}
