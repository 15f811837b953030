use miphy_tools::embedding::{
    compute_distances, embed, load_embedding, load_if_current, save_embedding, DistanceContext, EIGEN_ZERO,
};
use miphy_tools::{compute_embedding, parse, Embedding, ErrorCategory};
use std::io::Write;

const ULTRAMETRIC: &str = "((a:1,b:1):1,(c:1,d:1):1);";

#[test]
fn squared_patristic_distances() {
    let tree = parse("((a:1,b:2):3,c:4);").expect("parse");
    let sqrd = compute_distances(&tree);
    assert_eq!(sqrd.nrows(), 3);
    assert_eq!(sqrd[(0, 1)], 9.0);
    assert_eq!(sqrd[(0, 2)], 64.0);
    assert_eq!(sqrd[(1, 2)], 81.0);
    assert_eq!(sqrd, sqrd.transpose());
    assert!(sqrd.diagonal().iter().all(|v| *v == 0.0));

    let context = DistanceContext::new(&tree);
    let (a, c) = (tree.id("a").unwrap(), tree.id("c").unwrap());
    assert_eq!(context.common_ancestor(a, c), tree.root());
    assert_eq!(context.patristic(a, c), 8.0);
}

#[test]
fn mds_round_trip_on_an_ultrametric_tree() {
    let tree = parse(ULTRAMETRIC).expect("parse");
    let sqrd = compute_distances(&tree);
    let embedding = compute_embedding(&tree, 0).expect("coordinates");

    assert_eq!(embedding.rows(), 4);
    assert!(embedding.dims() <= 3, "used {} dimensions", embedding.dims());
    for i in 0..4 {
        for j in 0..4 {
            let expected = sqrd[(i, j)].sqrt();
            let got = embedding.distance(i, j);
            assert!((expected - got).abs() < 1e-6, "d({},{}) = {} expected {}", i, j, got, expected);
        }
    }
}

#[test]
fn dimension_cap() {
    let tree = parse(ULTRAMETRIC).expect("parse");
    let sqrd = compute_distances(&tree);

    let uncapped = embed(&sqrd, 0);
    let generous = embed(&sqrd, 50);
    assert_eq!(uncapped.dims(), generous.dims(), "0 keeps every eigenvalue above {}", EIGEN_ZERO);
    assert_eq!(uncapped.dims(), 3);

    let capped = embed(&sqrd, 2);
    assert_eq!(capped.dims(), 2);
    assert_eq!(capped.rows(), 4);
}

#[test]
fn spread_is_rms_distance_from_the_centroid() {
    let embedding = Embedding::from_row_major(3, 2, vec![0.0, 0.0, 2.0, 0.0, 1.0, 3.0]);
    // centroid (1, 1): squared distances 2, 2, 4
    let expected = (8.0f64 / 3.0).sqrt();
    assert!((embedding.spread(&[0, 1, 2]) - expected).abs() < 1e-12);
    assert_eq!(embedding.spread(&[1]), 0.0);
    assert_eq!(embedding.spread(&[]), 0.0);
}

#[test]
fn stored_coordinates_round_trip_and_go_stale() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tree.coords");
    let tree = parse(ULTRAMETRIC).expect("parse");
    let embedding = compute_embedding(&tree, 0).expect("coordinates");

    assert_eq!(load_if_current(&path, 4).expect("absent file"), None);

    save_embedding(&embedding, &path).expect("save");
    assert_eq!(load_embedding(&path).expect("load"), embedding);
    assert_eq!(load_if_current(&path, 4).expect("current"), Some(embedding));
    assert_eq!(load_if_current(&path, 5).expect("stale"), None);
}

#[test]
fn foreign_files_are_not_coordinates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "these are not coordinates at all, just some text").unwrap();

    let err = load_embedding(&path).expect_err("not a coordinate file");
    assert_eq!(err.category(), ErrorCategory::Io);
}

fn write_header(path: &std::path::Path, rows: u64, dims: u64) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(b"MIPHYEMB").unwrap();
    file.write_all(&1u32.to_le_bytes()).unwrap();
    file.write_all(&rows.to_le_bytes()).unwrap();
    file.write_all(&dims.to_le_bytes()).unwrap();
    // empty values
    file.write_all(&0u64.to_le_bytes()).unwrap();
}

#[test]
fn oversized_headers_are_corrupt() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tree.coords");

    write_header(&path, 1 << 40, 1 << 40);
    let err = load_embedding(&path).expect_err("rows * dims overflows");
    assert_eq!(err.category(), ErrorCategory::Io);

    // 4 * 2^62 wraps to 0, which matches the empty values
    write_header(&path, 4, 1 << 62);
    let err = load_if_current(&path, 4).expect_err("wrapping product");
    assert!(err.to_string().contains("corrupt"), "{}", err);
}

#[test]
fn overflowing_branch_lengths_are_not_embedded() {
    let tree = parse("((a:1e200,b:1e200):1,c:1);").expect("parse");
    let err = compute_embedding(&tree, 0).expect_err("infinite distances");
    assert_eq!(err.category(), ErrorCategory::Validation);
}
