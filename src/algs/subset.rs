//! Ancestor-preserving tree subsetting.
//!
//! Given a set of retained nodes, the kept node set is the retained nodes plus
//! every ancestor on their unique parent chains. The subsetted graph is the
//! subgraph induced on that set: exactly the original edges whose endpoints
//! are both kept, in the original edge insertion order.

use hashbrown::HashSet;

use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

/// What an empty retained set subsets to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySubsetPolicy {
    /// No nodes and no edges.
    #[default]
    Empty,
    /// Every root of the graph, with no edges.
    KeepRoots,
}

/// The node set of an ancestor-preserving subset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSubset {
    nodes: HashSet<String>,
}

impl NodeSubset {
    #[inline]
    pub fn contains(&self, n: &str) -> bool {
        self.nodes.contains(n)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Kept nodes in `graph`'s node order.
    pub fn nodes<'g>(&'g self, graph: &'g TreeGraph) -> impl Iterator<Item = &'g str> + 'g {
        graph.nodes().filter(move |n| self.contains(n))
    }

    /// Kept edges in `graph`'s edge insertion order.
    pub fn edges<'g>(&'g self, graph: &'g TreeGraph) -> impl Iterator<Item = (&'g str, &'g str)> + 'g {
        graph
            .edges()
            .filter(move |(u, v)| self.contains(u) && self.contains(v))
    }
}

/// Kept node set for `targets`: each target plus all of its ancestors.
///
/// The parent walk from a target stops at the first node already kept, so the
/// whole closure costs O(|kept|) parent lookups. Forests are supported; each
/// target contributes the chain up to its own root.
///
/// # Errors
/// `MissingNode` for the first target absent from `graph`.
pub fn ancestor_closure<'a, I>(
    graph: &TreeGraph,
    targets: I,
    policy: EmptySubsetPolicy,
) -> Result<NodeSubset, TreeDataError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut nodes: HashSet<String> = HashSet::new();
    for target in targets {
        if !graph.contains_node(target) {
            return Err(TreeDataError::MissingNode(target.to_string()));
        }
        if !nodes.insert(target.to_string()) {
            continue;
        }
        for a in graph.ancestors(target) {
            if !nodes.insert(a.to_string()) {
                break;
            }
        }
    }
    if nodes.is_empty() && policy == EmptySubsetPolicy::KeepRoots {
        nodes.extend(graph.roots().into_iter().map(str::to_string));
    }
    log::trace!(
        "ancestor closure kept {} of {} nodes",
        nodes.len(),
        graph.node_count()
    );
    Ok(NodeSubset { nodes })
}

/// Owned copy of the subgraph induced on `subset`, attributes deep-copied.
///
/// Node order and edge order follow `graph`.
pub fn subset_tree(graph: &TreeGraph, subset: &NodeSubset) -> TreeGraph {
    let mut out = TreeGraph::new();
    for n in subset.nodes(graph) {
        out.add_node_with_attrs(n, graph.node_attrs(n).cloned().unwrap_or_default());
    }
    for (u, v) in subset.edges(graph) {
        let attrs = graph.edge_attrs(u, v).cloned().unwrap_or_default();
        // source edges already form a forest, so the checks cannot fail
        if let Err(e) = out.add_edge_with_attrs(u, v, attrs) {
            log::error!("subset_tree dropped edge {u} -> {v}: {e}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::value::Value;

    fn kept(graph: &TreeGraph, targets: &[&str]) -> Vec<(String, String)> {
        let subset = ancestor_closure(graph, targets.iter().copied(), EmptySubsetPolicy::Empty).unwrap();
        subset
            .edges(graph)
            .map(|(u, v)| (u.to_string(), v.to_string()))
            .collect()
    }

    fn pairs(edges: &[(&str, &str)]) -> Vec<(String, String)> {
        edges
            .iter()
            .map(|(u, v)| (u.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn leaves_keep_their_lineage_in_edge_order() {
        let g = TreeGraph::balanced_tree(2, 3);
        let expected = pairs(&[
            ("0", "1"),
            ("0", "2"),
            ("1", "3"),
            ("2", "5"),
            ("3", "7"),
            ("3", "8"),
            ("5", "11"),
        ]);
        assert_eq!(kept(&g, &["7", "8", "11"]), expected);
        // request order does not change the output order
        assert_eq!(kept(&g, &["11", "8", "7"]), expected);
    }

    #[test]
    fn root_alone_has_no_edges() {
        let g = TreeGraph::balanced_tree(2, 3);
        let subset = ancestor_closure(&g, ["0"], EmptySubsetPolicy::Empty).unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.edges(&g).count(), 0);
    }

    #[test]
    fn empty_policy() {
        let g = TreeGraph::balanced_tree(2, 2);
        let none: [&str; 0] = [];
        let empty = ancestor_closure(&g, none, EmptySubsetPolicy::Empty).unwrap();
        assert!(empty.is_empty());
        let roots = ancestor_closure(&g, none, EmptySubsetPolicy::KeepRoots).unwrap();
        assert_eq!(roots.nodes(&g).collect::<Vec<_>>(), vec!["0"]);
        assert_eq!(subset_tree(&g, &roots).edge_count(), 0);
    }

    #[test]
    fn forest_targets_keep_each_root() {
        let g = TreeGraph::from_edges([("a", "b"), ("b", "c"), ("x", "y")]).unwrap();
        let subset = ancestor_closure(&g, ["c", "y"], EmptySubsetPolicy::Empty).unwrap();
        let sub = subset_tree(&g, &subset);
        assert_eq!(sub.roots(), vec!["a", "x"]);
        assert_eq!(sub.edge_count(), 3);
    }

    #[test]
    fn missing_target_is_an_error() {
        let g = TreeGraph::balanced_tree(2, 1);
        let err = ancestor_closure(&g, ["9"], EmptySubsetPolicy::Empty).unwrap_err();
        assert_eq!(err, TreeDataError::MissingNode("9".into()));
    }

    #[test]
    fn subset_tree_deep_copies_attributes() {
        let mut g = TreeGraph::balanced_tree(2, 2);
        g.set_node_attr("3", "depth", 2).unwrap();
        g.set_edge_attr("1", "3", "length", 0.5).unwrap();
        let subset = ancestor_closure(&g, ["3"], EmptySubsetPolicy::Empty).unwrap();
        let mut sub = subset_tree(&g, &subset);
        assert_eq!(sub.nodes().collect::<Vec<_>>(), vec!["0", "1", "3"]);
        assert_eq!(sub.edge_attr("1", "3", "length"), Some(&Value::Float(0.5)));
        sub.set_node_attr("3", "depth", 99).unwrap();
        assert_eq!(g.node_attr("3", "depth"), Some(&Value::Int(2)));
    }
}
