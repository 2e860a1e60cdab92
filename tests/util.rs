#![allow(dead_code)]
use tree_data::prelude::*;

/// Leaf labels of a balanced binary tree of height 3: `"7"..="14"`.
pub fn leaf_labels() -> Vec<String> {
    (7..15).map(|i| i.to_string()).collect()
}

/// Balanced binary tree of height 3 with a `depth` attribute on every node.
pub fn depth_tree() -> TreeGraph {
    let mut g = TreeGraph::balanced_tree(2, 3);
    let depths = g.depths();
    for (n, d) in depths {
        g.set_node_attr(&n, "depth", d).unwrap();
    }
    g
}

/// 8×8 container whose obs and var axes are both the leaves of
/// [`depth_tree`], with an `anno` column on each axis and the tree as
/// `obst["tree"]` and `vart["tree"]`.
pub fn leaf_container() -> TreeData {
    let obs = Frame::from_labels(leaf_labels())
        .unwrap()
        .with_column("anno", 0..8i64)
        .unwrap();
    let var = Frame::from_labels(leaf_labels())
        .unwrap()
        .with_column("anno", 0..8i64)
        .unwrap();
    let x = Matrix::from_vec(8, 8, (0..64u32).map(f64::from).collect()).unwrap();
    TreeData::new(x, obs, var)
        .unwrap()
        .with_obst("tree", depth_tree())
        .unwrap()
        .with_vart("tree", depth_tree())
        .unwrap()
}

pub fn pairs(edges: &[(&str, &str)]) -> Vec<(String, String)> {
    edges
        .iter()
        .map(|(u, v)| (u.to_string(), v.to_string()))
        .collect()
}

/// Edges kept for leaves 7, 8 and 11, in insertion order.
pub fn lineage_7_8_11() -> Vec<(String, String)> {
    pairs(&[
        ("0", "1"),
        ("0", "2"),
        ("1", "3"),
        ("2", "5"),
        ("3", "7"),
        ("3", "8"),
        ("5", "11"),
    ])
}
