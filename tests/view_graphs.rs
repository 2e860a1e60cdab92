mod util;

use std::collections::BTreeSet;

use tree_data::prelude::*;
use util::*;

#[test]
fn subset_tree_by_position_and_by_label() {
    let tdata = leaf_container();
    let by_pos = tdata.select(Selector::positions([0, 1, 4]), ..).unwrap();
    assert_eq!(by_pos.obst("tree").unwrap().edges(), lineage_7_8_11());
    let by_label = tdata.select(Selector::labels(["7", "8", "11"]), ..).unwrap();
    assert_eq!(by_label.obst("tree").unwrap().edges(), lineage_7_8_11());
    // the var tree is untouched by an obs-only selection
    assert_eq!(by_label.vart("tree").unwrap().edge_count(), 14);
}

#[test]
fn view_attribute_edits_reach_the_parent() {
    let tdata = leaf_container();
    tdata.obst("tree").unwrap().set_node_attrs_all("in_subset", false);
    let subset = tdata.select(Selector::labels(["7", "8"]), ..).unwrap();
    let tree = subset.obst("tree").unwrap();
    assert!(tree.is_restricted());
    assert!(tree.same_graph(&tdata.obst("tree").unwrap()));
    tree.set_node_attrs_all("in_subset", true);

    let flagged: BTreeSet<String> = tdata
        .obst("tree")
        .unwrap()
        .nodes()
        .into_iter()
        .filter(|n| {
            tdata.obst("tree").unwrap().node_attr(n, "in_subset").unwrap() == Some(Value::Bool(true))
        })
        .collect();
    let expected: BTreeSet<String> = ["8", "0", "3", "7", "1"].iter().map(|s| s.to_string()).collect();
    assert_eq!(flagged, expected);
}

#[test]
fn view_rejects_structural_edits() {
    let tdata = leaf_container();
    let subset = tdata.select(Selector::labels(["7", "8"]), ..).unwrap();
    let tree = subset.obst("tree").unwrap();
    let before_parent = tdata.obst("tree").unwrap().to_owned_graph();
    let before_view = tree.edges();

    for err in [
        tree.remove_node("8").unwrap_err(),
        tree.add_node("new").map(|_| ()).unwrap_err(),
        tree.add_edge("8", "new").unwrap_err(),
        tree.remove_edge("3", "8").map(|_| ()).unwrap_err(),
    ] {
        assert!(matches!(err, TreeDataError::StructuralMutation(_)), "{err}");
    }
    assert!(subset.is_view(), "rejection does not promote");
    assert_eq!(tree.edges(), before_view);
    assert_eq!(tdata.obst("tree").unwrap().to_owned_graph(), before_parent);
}

#[test]
fn view_handle_hides_nodes_outside_the_subset() {
    let tdata = leaf_container();
    let subset = tdata.select(Selector::labels(["7"]), ..).unwrap();
    let tree = subset.obst("tree").unwrap();
    assert_eq!(tree.nodes(), vec!["0", "1", "3", "7"]);
    assert_eq!(tree.root().unwrap(), "0");
    assert_eq!(tree.leaves(), vec!["7"]);
    assert_eq!(tree.children("3").unwrap(), vec!["7"]);
    assert_eq!(tree.parent("7").unwrap().as_deref(), Some("3"));
    assert!(!tree.contains_node("8"));
    assert_eq!(
        tree.set_node_attr("8", "k", 1),
        Err(TreeDataError::NodeOutsideView("8".into()))
    );
    assert_eq!(
        tree.node_attr("missing", "k"),
        Err(TreeDataError::MissingNode("missing".into()))
    );
    tree.set_edge_attr("3", "7", "length", 0.25).unwrap();
    assert_eq!(
        tdata.obst("tree").unwrap().edge_attr("3", "7", "length").unwrap(),
        Some(Value::Float(0.25))
    );
    assert!(tree.set_edge_attr("3", "8", "length", 1.0).is_err());
}

#[test]
fn view_subset_tracks_parent_structure() {
    let tdata = leaf_container();
    let subset = tdata.select(Selector::labels(["7"]), ..).unwrap();
    assert_eq!(subset.obst("tree").unwrap().edge_count(), 3);

    // splice a new internal node between 3 and 7 on the owner
    let owner = tdata.obst("tree").unwrap();
    owner.remove_edge("3", "7").unwrap();
    owner.add_edge("3", "3b").unwrap();
    owner.add_edge("3b", "7").unwrap();

    let tree = subset.obst("tree").unwrap();
    assert!(tree.contains_node("3b"));
    assert_eq!(tree.parent("7").unwrap().as_deref(), Some("3b"));
    assert_eq!(tree.edge_count(), 4);
}

#[test]
fn empty_selection_follows_policy() {
    let tdata = leaf_container();
    let none: Vec<usize> = Vec::new();

    let empty = tdata.select(Selector::positions(none.clone()), ..).unwrap();
    assert_eq!(empty.shape(), (0, 8));
    let tree = empty.obst("tree").unwrap();
    assert_eq!(tree.node_count(), 0);
    assert_eq!(tree.edge_count(), 0);
    assert_eq!(tree.root(), Err(TreeDataError::NoRoot));

    let keep_roots = tdata
        .copy()
        .unwrap()
        .with_options(TreeDataOptions::default().with_empty_subset(EmptySubsetPolicy::KeepRoots));
    let rooted = keep_roots.select(Selector::positions(none), ..).unwrap();
    let tree = rooted.obst("tree").unwrap();
    assert_eq!(tree.nodes(), vec!["0"]);
    assert_eq!(tree.edge_count(), 0);
}

#[test]
fn forest_annotations_are_supported() {
    let obs = Frame::from_labels(["a1", "a2", "b1"]).unwrap();
    let var = Frame::from_labels(["v"]).unwrap();
    let forest =
        TreeGraph::from_edges([("A", "a1"), ("A", "a2"), ("B", "b1")]).unwrap();
    let tdata = TreeData::new(Matrix::zeros(3, 1), obs, var)
        .unwrap()
        .with_obst("lineage", forest)
        .unwrap();
    assert!(matches!(
        tdata.obst("lineage").unwrap().root(),
        Err(TreeDataError::MultipleRoots(_))
    ));
    let view = tdata.select(Selector::labels(["a2", "b1"]), ..).unwrap();
    let g = view.obst("lineage").unwrap().to_owned_graph();
    assert_eq!(g.roots(), vec!["A", "B"]);
    assert_eq!(g.edges().collect::<Vec<_>>(), vec![("A", "a2"), ("B", "b1")]);
}

#[test]
fn changing_policy_on_a_view_recomputes_its_subset() {
    let tdata = leaf_container();
    let none: Vec<usize> = Vec::new();
    let view = tdata.select(Selector::positions(none), ..).unwrap();
    assert_eq!(view.obst("tree").unwrap().node_count(), 0);

    let view = view.with_options(TreeDataOptions::default().with_empty_subset(EmptySubsetPolicy::KeepRoots));
    let tree = view.obst("tree").unwrap();
    assert_eq!(tree.nodes(), vec!["0"]);
    assert_eq!(tree.node_count(), 1);

    let view = view.with_options(TreeDataOptions::default());
    assert_eq!(view.obst("tree").unwrap().node_count(), 0);
}

#[test]
fn per_node_attribute_values_are_all_or_nothing() {
    let tdata = leaf_container();
    let subset = tdata.select(Selector::labels(["7"]), ..).unwrap();
    let tree = subset.obst("tree").unwrap();

    assert_eq!(
        tree.set_node_attr_values("score", [("7", 1.0), ("8", 2.0)]),
        Err(TreeDataError::NodeOutsideView("8".into()))
    );
    let owner = tdata.obst("tree").unwrap();
    assert_eq!(owner.node_attr("7", "score").unwrap(), None);
    assert_eq!(owner.node_attr("8", "score").unwrap(), None);

    tree.set_node_attr_values("score", [("3", 0.5), ("7", 1.0)]).unwrap();
    assert_eq!(owner.node_attr("3", "score").unwrap(), Some(Value::Float(0.5)));
    assert_eq!(owner.node_attr("7", "score").unwrap(), Some(Value::Float(1.0)));
    assert!(subset.is_view());
}
