//! Structural guarantees of the build → mark → extract pipeline.
//!
//! ```bash
//! cargo test --package treeprune_core --test properties
//! ```

use std::collections::{BTreeSet, HashSet};

use treeprune_core::{
    EmptyTreePolicy, NodeId, PathTree, ReservationMarker, TreeBuilder, exclusion_roots,
    extract_exclusions,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Small deterministic generator so the tests need no randomness crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn sample_paths(seed: u64, count: usize) -> Vec<String> {
    let mut rng = Lcg(seed);
    let dirs = ["src", "include", "drivers", "boards", "lib", "samples", "doc"];
    let exts = ["c", "h", "cpp", "hpp", "txt", "rst"];
    (0..count)
        .map(|_| {
            let depth = 1 + rng.below(5) as usize;
            let mut path = String::new();
            for _ in 0..depth {
                path.push('/');
                path.push_str(dirs[rng.below(dirs.len() as u64) as usize]);
                path.push_str(&rng.below(3).to_string());
            }
            let ext = exts[rng.below(exts.len() as u64) as usize];
            path.push_str(&format!("/f{}.{}", rng.below(20), ext));
            path
        })
        .collect()
}

fn pick(paths: &[String], seed: u64, count: usize) -> Vec<String> {
    let mut rng = Lcg(seed);
    (0..count).map(|_| paths[rng.below(paths.len() as u64) as usize].clone()).collect()
}

fn reserved_set(tree: &PathTree) -> BTreeSet<String> {
    tree.iter().filter(|&id| tree.is_reserved(id)).map(|id| tree.full_path(id)).collect()
}

fn assert_invariants(tree: &PathTree) {
    for id in tree.iter() {
        let node = tree.node(id);
        if let Some(parent) = node.parent() {
            assert_eq!(tree.node(parent).child(node.name()), Some(id));
            if node.is_reserved() {
                assert!(tree.is_reserved(parent), "{} reserved but parent is not", tree.full_path(id));
            }
        }
        let children: Vec<NodeId> = node.children().collect();
        if !node.is_reserved() {
            for &child in &children {
                assert!(!tree.is_reserved(child), "{} reserved under unreserved parent", tree.full_path(child));
            }
        }
        let names: HashSet<&str> = children.iter().map(|&c| tree.node(c).name()).collect();
        assert_eq!(names.len(), children.len(), "duplicate child names under {}", tree.full_path(id));
    }
}

fn is_ancestor(tree: &PathTree, ancestor: NodeId, mut node: NodeId) -> bool {
    while let Some(parent) = tree.node(node).parent() {
        if parent == ancestor {
            return true;
        }
        node = parent;
    }
    false
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_single_dependency() {
    let files = ["/a/b/c.c", "/a/b/c.h", "/a/d/e.h", "/x/y/z.txt"];
    let (mut tree, _) = TreeBuilder::default().build("/", files);
    ReservationMarker::default().mark(&mut tree, ["/a/b/c.c"]);

    let reserved = reserved_set(&tree);
    assert!(reserved.contains("/a/b/c.c"));
    assert!(reserved.contains("/a/b"));
    assert!(reserved.contains("/a"));
    assert!(!reserved.contains("/a/b/c.h"));

    let exclusions = extract_exclusions(&tree, EmptyTreePolicy::ExcludeNothing).unwrap();
    assert_eq!(exclusions, vec!["/a/b/c.h", "/a/d", "/x"]);
}

#[test]
fn test_scenario_missing_dependency_leaves_tree_untouched() {
    let files = ["/a/b/c.c", "/a/b/c.h", "/a/d/e.h", "/x/y/z.txt"];
    let (mut tree, _) = TreeBuilder::default().build("/", files);
    let before_len = tree.len();

    let stats = ReservationMarker::default().mark(&mut tree, ["/nonexistent/path.c"]);

    assert_eq!(stats.missing, 1);
    assert_eq!(tree.len(), before_len);
    assert!(reserved_set(&tree).is_empty());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_invariants_hold_after_every_call() {
    let paths = sample_paths(7, 300);
    let deps = pick(&paths, 11, 40);
    let mut tree = PathTree::new("/");

    for path in &paths {
        let segments = tree.segments_of(path).unwrap();
        tree.ensure_path(segments);
        assert_invariants(&tree);
    }
    for path in &deps {
        let id = tree.find_path(tree.segments_of(path).unwrap()).unwrap();
        tree.mark_reserved_upward(id);
        assert_invariants(&tree);
    }
}

#[test]
fn test_marking_is_idempotent() {
    let paths = sample_paths(3, 500);
    let deps = pick(&paths, 5, 60);
    let (mut tree, _) = TreeBuilder::default().build("/", &paths);
    let marker = ReservationMarker::default();

    marker.mark(&mut tree, &deps);
    let once = reserved_set(&tree);
    let again = marker.mark(&mut tree, &deps);

    assert_eq!(again.newly_reserved, 0);
    assert_eq!(reserved_set(&tree), once);
}

#[test]
fn test_marking_is_order_independent() {
    let paths = sample_paths(21, 400);
    let sources = [pick(&paths, 1, 30), pick(&paths, 2, 30), pick(&paths, 3, 30)];
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    let mut results = Vec::new();
    for order in orders {
        let (mut tree, _) = TreeBuilder::default().build("/", &paths);
        let marker = ReservationMarker::default();
        for index in order {
            let mut source = sources[index].clone();
            source.reverse();
            marker.mark(&mut tree, &source);
        }
        results.push(reserved_set(&tree));
    }

    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}

#[test]
fn test_extraction_is_sound_and_minimal() {
    for seed in 0..8 {
        let paths = sample_paths(100 + seed, 300);
        let deps = pick(&paths, 200 + seed, 25);
        let (mut tree, _) = TreeBuilder::default().build("/", &paths);
        ReservationMarker::default().mark(&mut tree, &deps);

        let roots = exclusion_roots(&tree, EmptyTreePolicy::ExcludeNothing).unwrap();

        let covered: BTreeSet<NodeId> = roots
            .iter()
            .flat_map(|&root| tree.descendants(root))
            .filter(|&id| tree.node(id).is_leaf())
            .collect();
        let unreserved: BTreeSet<NodeId> =
            tree.leaves().filter(|&id| !tree.is_reserved(id)).collect();
        assert_eq!(covered, unreserved, "seed {}", seed);

        for &root in &roots {
            assert!(!tree.is_reserved(root));
            let parent = tree.node(root).parent().unwrap();
            assert!(tree.is_reserved(parent), "exclusion root is not the highest collapsible node");
            for &other in &roots {
                assert!(!is_ancestor(&tree, root, other));
            }
        }
    }
}

#[test]
fn test_round_trip_through_tree() {
    let paths = sample_paths(42, 1_000);
    let (tree, _) = TreeBuilder::default().build("/", &paths);
    for path in &paths {
        let id = tree.find_path(tree.segments_of(path).unwrap()).unwrap();
        assert_eq!(&tree.full_path(id), path);
    }
}

#[test]
fn test_wide_directory_builds_without_sibling_scans() {
    let paths: Vec<String> = (0..60_000).map(|i| format!("/out/objs/obj{i:05}.o")).collect();
    let (mut tree, stats) = TreeBuilder::default().build("/", &paths);

    assert_eq!(stats.inserted, 60_000);
    // root, out, objs + files
    assert_eq!(tree.len(), 60_003);

    ReservationMarker::default().mark(&mut tree, ["/out/objs/obj00042.o"]);
    let exclusions = extract_exclusions(&tree, EmptyTreePolicy::ExcludeNothing).unwrap();
    assert_eq!(exclusions.len(), 59_999);
    assert_eq!(exclusions[0], "/out/objs/obj00000.o");
    assert!(!exclusions.contains(&"/out/objs/obj00042.o".to_string()));
}

#[test]
fn test_deep_tree_extraction() {
    let mut tree = PathTree::new("/");
    let deep: Vec<String> = (0..20_000).map(|i| format!("level{i}")).collect();
    let leaf = tree.ensure_path(deep.iter().map(String::as_str));
    let sibling = tree.ensure_path(["level0", "level1", "other.c"]);
    tree.mark_reserved_upward(leaf);

    let roots = exclusion_roots(&tree, EmptyTreePolicy::ExcludeNothing).unwrap();
    assert_eq!(roots, vec![sibling]);
}
