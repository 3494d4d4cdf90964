//! Integration tests for loading fortune trees from disk
use fortune_core::{
    load_paths, load_paths_with_options, write_index_for, FileSystemTree, FortuneError,
    LengthFilter, LoadOptions, NodeKind, ProbabilityPath, DEFAULT_DELIMITER,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a quotation file whose quotations have exactly the given byte lengths
fn write_quotes(path: &Path, lengths: &[usize]) {
    let body: Vec<String> = lengths
        .iter()
        .map(|&len| format!("{}\n", "q".repeat(len - 1)))
        .collect();
    fs::write(path, body.join("%\n")).unwrap();
}

/// Write a quotation file plus its index
fn write_indexed(path: &Path, lengths: &[usize]) {
    write_quotes(path, lengths);
    write_index_for(path, DEFAULT_DELIMITER).unwrap();
}

/// (path, kind, entries, files) for every node, sorted by path
fn shape(tree: &FileSystemTree) -> Vec<(PathBuf, NodeKind, u64, u64, usize)> {
    let mut nodes: Vec<_> = tree
        .iter()
        .map(|(_, n)| (n.path.clone(), n.kind, n.num_entries, n.num_files, n.children.len()))
        .collect();
    nodes.sort_by(|a, b| a.0.cmp(&b.0));
    nodes
}

#[test]
fn test_directory_and_single_file_scenario() {
    let tmp = TempDir::new().unwrap();
    let dir_a = tmp.path().join("A");
    fs::create_dir(&dir_a).unwrap();
    write_indexed(&dir_a.join("a1"), &[10, 30, 50]);
    write_quotes(&dir_a.join("a2"), &[12, 14]);
    let file_b = tmp.path().join("b");
    write_indexed(&file_b, &[5, 8, 11, 15, 20]);

    let tree = load_paths(
        &[
            ProbabilityPath::new(&dir_a, 60.0),
            ProbabilityPath::new(&file_b, 40.0),
        ],
        100,
        0,
    )
    .unwrap();

    let root = tree.root();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.num_entries, 8);
    assert_eq!(root.num_files, 2);
    assert_eq!(root.percent, 100.0);

    let a: Vec<_> = tree.children(FileSystemTree::ROOT).collect();
    assert_eq!(a[0].path, dir_a);
    assert_eq!(a[0].kind, NodeKind::Directory);
    assert_eq!(a[0].percent, 60.0);
    assert_eq!(a[0].children.len(), 1);
    assert_eq!(a[0].num_entries, 3);
    assert_eq!(a[0].num_files, 1);

    let a1 = tree.get(a[0].children[0]).unwrap();
    assert_eq!(a1.path, dir_a.join("a1"));
    assert_eq!(a1.index_path, Some(dir_a.join("a1.dat")));
    let table = a1.table.as_ref().unwrap();
    assert_eq!(table.shortest_length, 10);
    assert_eq!(table.longest_length, 50);

    assert_eq!(a[1].path, file_b);
    assert_eq!(a[1].kind, NodeKind::File);
    assert_eq!(a[1].percent, 40.0);
    assert_eq!(a[1].num_entries, 5);

    tree.verify_counts().unwrap();
}

#[test]
fn test_missing_top_level_path_fails() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("good");
    write_indexed(&good, &[10]);

    let err = load_paths(
        &[
            ProbabilityPath::new(&good, 50.0),
            ProbabilityPath::new(tmp.path().join("nowhere"), 50.0),
        ],
        0,
        0,
    )
    .unwrap_err();

    match err {
        FortuneError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_top_level_file_fails() {
    let tmp = TempDir::new().unwrap();
    let unindexed = tmp.path().join("unindexed");
    write_quotes(&unindexed, &[10]);

    let err = load_paths(&[ProbabilityPath::new(&unindexed, 100.0)], 0, 0).unwrap_err();
    assert!(matches!(err, FortuneError::MissingIndex(_)));
}

#[test]
fn test_bad_entries_inside_directory_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("quotes");
    fs::create_dir(&dir).unwrap();

    write_indexed(&dir.join("good1"), &[10, 20]);
    write_indexed(&dir.join("good2"), &[30]);
    write_indexed(&dir.join("good3"), &[5, 6, 7]);

    write_quotes(&dir.join("no_index"), &[10]);

    write_quotes(&dir.join("old_version"), &[10]);
    let mut old = vec![0u8; 28];
    old[0..4].copy_from_slice(&1u32.to_be_bytes());
    fs::write(dir.join("old_version.dat"), old).unwrap();

    write_quotes(&dir.join("corrupt"), &[10]);
    fs::write(dir.join("corrupt.dat"), [0u8, 0, 0, 2, 0, 0]).unwrap();

    let nested = dir.join("nested");
    fs::create_dir(&nested).unwrap();
    write_indexed(&nested.join("deep"), &[10]);

    #[cfg(unix)]
    std::os::unix::fs::symlink(tmp.path().join("gone"), dir.join("dangling")).unwrap();

    let tree = load_paths(&[ProbabilityPath::new(&dir, 100.0)], 0, 0).unwrap();

    let dir_node = tree.children(FileSystemTree::ROOT).next().unwrap();
    let names: Vec<_> = tree
        .children(tree.root().children[0])
        .map(|n| n.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["good1", "good2", "good3"]);
    assert_eq!(dir_node.num_files, 3);
    assert_eq!(dir_node.num_entries, 6);
    assert!(tree.find(&nested.join("deep")).is_none());
    assert!(tree.find(&dir.join("no_index")).is_none());
    assert!(tree.find(&dir.join("old_version")).is_none());

    tree.verify_counts().unwrap();
}

#[test]
fn test_directory_without_valid_files_is_recorded() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("empty");
    fs::create_dir(&dir).unwrap();
    write_quotes(&dir.join("plain"), &[10]);

    let tree = load_paths(&[ProbabilityPath::new(&dir, 100.0)], 0, 0).unwrap();

    assert_eq!(tree.root().children.len(), 1);
    let dir_node = tree.children(FileSystemTree::ROOT).next().unwrap();
    assert_eq!(dir_node.kind, NodeKind::Directory);
    assert!(dir_node.children.is_empty());
    assert_eq!(dir_node.num_files, 0);
    assert_eq!(dir_node.num_entries, 0);
    assert!(dir_node.table.is_none());
    assert!(dir_node.index_path.is_none());
    assert_eq!(tree.root().num_files, 0);
}

#[test]
fn test_length_filter_inside_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("mixed");
    fs::create_dir(&dir).unwrap();
    write_indexed(&dir.join("short"), &[5, 10]);
    write_indexed(&dir.join("medium"), &[40, 60]);
    write_indexed(&dir.join("long"), &[200, 300]);

    // longest must reach 20, shortest must not pass 100
    let tree = load_paths(&[ProbabilityPath::new(&dir, 100.0)], 100, 20).unwrap();

    let kept: Vec<_> = tree
        .children(tree.root().children[0])
        .map(|n| n.path.clone())
        .collect();
    assert_eq!(kept, vec![dir.join("medium")]);
    assert_eq!(tree.root().num_entries, 2);
}

#[test]
fn test_zero_bounds_keep_everything() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("all");
    fs::create_dir(&dir).unwrap();
    write_indexed(&dir.join("tiny"), &[1]);
    write_indexed(&dir.join("huge"), &[5000]);

    let tree = load_paths(&[ProbabilityPath::new(&dir, 100.0)], 0, 0).unwrap();

    assert_eq!(tree.root().num_files, 2);
}

#[test]
fn test_loading_twice_gives_same_tree() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("corpus");
    fs::create_dir(&dir).unwrap();
    for (i, name) in ["c", "a", "e", "b", "d"].iter().enumerate() {
        write_indexed(&dir.join(name), &[10 + i, 20 + i]);
    }
    let single = tmp.path().join("single");
    write_indexed(&single, &[7, 9, 11]);
    let paths = [
        ProbabilityPath::new(&dir, 70.0),
        ProbabilityPath::new(&single, 30.0),
    ];

    let first = load_paths(&paths, 0, 0).unwrap();
    let second = load_paths(&paths, 0, 0).unwrap();

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.root().num_entries, 13);
}

#[test]
fn test_parallel_validation_matches_sequential() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("many");
    fs::create_dir(&dir).unwrap();
    for i in 0..24 {
        let path = dir.join(format!("file{i:02}"));
        if i % 3 == 0 {
            write_quotes(&path, &[10]);
        } else {
            write_indexed(&path, &[10 + i, 15 + i]);
        }
    }
    let paths = [ProbabilityPath::new(&dir, 100.0)];

    let sequential = load_paths_with_options(&paths, &LoadOptions::default()).unwrap();
    let parallel = load_paths_with_options(
        &paths,
        &LoadOptions {
            filter: LengthFilter::default(),
            parallel_validation: true,
        },
    )
    .unwrap();

    let order = |tree: &FileSystemTree| -> Vec<PathBuf> {
        tree.children(tree.root().children[0])
            .map(|n| n.path.clone())
            .collect()
    };
    assert_eq!(order(&sequential), order(&parallel));
    assert_eq!(shape(&sequential), shape(&parallel));
    assert_eq!(parallel.root().num_files, 16);
    parallel.verify_counts().unwrap();
}

#[test]
fn test_tree_serializes_to_json() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("json");
    write_indexed(&file, &[10, 20]);

    let tree = load_paths(&[ProbabilityPath::new(&file, 100.0)], 0, 0).unwrap();
    let json = tree.to_json().unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"][0]["kind"], "Root");
    assert_eq!(value["nodes"][1]["num_entries"], 2);
}
