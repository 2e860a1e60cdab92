//! In-memory directed forest with attribute dictionaries.
//!
//! [`TreeGraph`] keeps nodes and edges in insertion order (for deterministic
//! iteration) next to hash maps for O(1) lookup, and mirrors every edge in a
//! per-node `parent`/`children` pair. Each node has at most one parent, so the
//! structure is always a tree or a forest.

use hashbrown::{Equivalent, HashMap};
use std::collections::VecDeque;

use crate::debug_invariants::DebugInvariants;
use crate::topology::value::{AttrMap, Value};
use crate::tree_error::TreeDataError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EdgeKey(String, String);

#[derive(Hash)]
struct EdgeRef<'a>(&'a str, &'a str);

impl Equivalent<EdgeKey> for EdgeRef<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        self.0 == key.0 && self.1 == key.1
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct NodeEntry {
    attrs: AttrMap,
    parent: Option<String>,
    children: Vec<String>,
}

/// Directed forest with insertion-ordered nodes and edges.
///
/// # Invariants
///
/// - Each node appears exactly once in `order`; `nodes` holds exactly those keys.
/// - Each edge appears exactly once in `edge_order`; `edges` holds exactly those keys.
/// - `u -> v` is an edge iff `nodes[v].parent == Some(u)` iff `v ∈ nodes[u].children`.
/// - No cycles: following `parent` from any node terminates.
///
/// `version` changes on every structural modification (node or edge added or
/// removed). Attribute edits leave it untouched.
#[derive(Clone, Debug, Default)]
pub struct TreeGraph {
    nodes: HashMap<String, NodeEntry>,
    order: Vec<String>,
    edges: HashMap<EdgeKey, AttrMap>,
    edge_order: Vec<EdgeKey>,
    version: u64,
}

impl PartialEq for TreeGraph {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.edge_order == other.edge_order
            && self
                .order
                .iter()
                .all(|n| self.node_attrs(n) == other.node_attrs(n))
            && self
                .edge_order
                .iter()
                .all(|EdgeKey(u, v)| self.edge_attrs(u, v) == other.edge_attrs(u, v))
    }
}

impl TreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(parent, child)` pairs, in order.
    ///
    /// # Example
    /// ```rust
    /// use tree_data::topology::TreeGraph;
    /// let g = TreeGraph::from_edges([("r", "a"), ("r", "b"), ("a", "c")]).unwrap();
    /// assert_eq!(g.root().unwrap(), "r");
    /// assert_eq!(g.parent("c"), Some("a"));
    /// ```
    pub fn from_edges<I, A, B>(edges: I) -> Result<Self, TreeDataError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut g = Self::default();
        for (u, v) in edges {
            g.add_edge(u, v)?;
        }
        Ok(g)
    }

    /// Perfectly balanced `r`-ary tree of height `h`, nodes labelled in
    /// breadth-first order `"0"`, `"1"`, …; the children of node `i` are
    /// `r*i + 1 ..= r*i + r`.
    pub fn balanced_tree(r: usize, h: usize) -> Self {
        let mut g = Self::default();
        g.add_node("0");
        if r == 0 {
            return g;
        }
        let mut frontier = vec![0usize];
        let mut next = 1usize;
        for _ in 0..h {
            let mut level = Vec::with_capacity(frontier.len() * r);
            for &parent in &frontier {
                for _ in 0..r {
                    g.push_edge(parent.to_string(), next.to_string(), AttrMap::new());
                    level.push(next);
                    next += 1;
                }
            }
            frontier = level;
        }
        g
    }

    /// Monotonic structural version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, n: &str) -> bool {
        self.nodes.contains_key(n)
    }

    #[inline]
    pub fn contains_edge(&self, u: &str, v: &str) -> bool {
        self.edges.contains_key(&EdgeRef(u, v))
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Edges `(parent, child)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edge_order
            .iter()
            .map(|EdgeKey(u, v)| (u.as_str(), v.as_str()))
    }

    /// The unique parent of `n`, if any.
    #[inline]
    pub fn parent(&self, n: &str) -> Option<&str> {
        self.nodes.get(n).and_then(|e| e.parent.as_deref())
    }

    /// Children of `n` in edge insertion order (empty if `n` is absent).
    pub fn children<'a>(&'a self, n: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.nodes
            .get(n)
            .into_iter()
            .flat_map(|e| e.children.iter().map(String::as_str))
    }

    /// Ancestors of `n`, nearest first, excluding `n` itself.
    pub fn ancestors<'a>(&'a self, n: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let mut cur = self.parent(n);
        std::iter::from_fn(move || {
            let p = cur?;
            cur = self.parent(p);
            Some(p)
        })
    }

    /// Nodes with no parent, in node order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes()
            .filter(|n| self.parent(n).is_none())
            .collect()
    }

    /// The single root of a tree.
    ///
    /// # Errors
    /// `NoRoot` for an empty graph, `MultipleRoots` for a forest.
    pub fn root(&self) -> Result<&str, TreeDataError> {
        let roots = self.roots();
        match roots.as_slice() {
            [] => Err(TreeDataError::NoRoot),
            [root] => Ok(*root),
            many => Err(TreeDataError::MultipleRoots(
                many.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    /// Nodes with no children, in node order.
    pub fn leaves(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|n| self.nodes[n.as_str()].children.is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Breadth-first depth of every node from its root.
    pub fn depths(&self) -> HashMap<String, usize> {
        let mut out = HashMap::with_capacity(self.order.len());
        let mut queue: VecDeque<(&str, usize)> =
            self.roots().into_iter().map(|r| (r, 0)).collect();
        while let Some((n, d)) = queue.pop_front() {
            out.insert(n.to_string(), d);
            queue.extend(self.children(n).map(|c| (c, d + 1)));
        }
        out
    }

    /// Insert `n` if absent. Returns `true` if the node is new.
    pub fn add_node(&mut self, n: impl Into<String>) -> bool {
        let n = n.into();
        if self.nodes.contains_key(n.as_str()) {
            return false;
        }
        self.nodes.insert(n.clone(), NodeEntry::default());
        self.order.push(n);
        self.bump();
        true
    }

    /// Insert `n` if absent and merge `attrs` into its dictionary.
    pub fn add_node_with_attrs(&mut self, n: impl Into<String>, attrs: AttrMap) {
        let n = n.into();
        self.add_node(n.clone());
        if let Some(entry) = self.nodes.get_mut(n.as_str()) {
            entry.attrs.extend(attrs);
        }
    }

    /// Remove `n` and every incident edge; its children become roots.
    ///
    /// # Errors
    /// `MissingNode` if `n` is absent.
    pub fn remove_node(&mut self, n: &str) -> Result<AttrMap, TreeDataError> {
        let entry = self
            .nodes
            .remove(n)
            .ok_or_else(|| TreeDataError::MissingNode(n.to_string()))?;
        if let Some(p) = &entry.parent {
            if let Some(pe) = self.nodes.get_mut(p.as_str()) {
                pe.children.retain(|c| c != n);
            }
        }
        for c in &entry.children {
            if let Some(ce) = self.nodes.get_mut(c.as_str()) {
                ce.parent = None;
            }
        }
        self.edges.retain(|EdgeKey(u, v), _| u != n && v != n);
        self.edge_order.retain(|EdgeKey(u, v)| u != n && v != n);
        self.order.retain(|x| x != n);
        self.bump();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(entry.attrs)
    }

    /// Add edge `u -> v`, creating missing endpoints.
    ///
    /// # Errors
    /// - `DuplicateEdge` if the edge exists,
    /// - `CycleDetected` if `v` is `u`,
    /// - `MultipleParents` if `v` already has a parent,
    /// - `CycleDetected` if `v` is an ancestor of `u`.
    pub fn add_edge(&mut self, u: impl Into<String>, v: impl Into<String>) -> Result<(), TreeDataError> {
        self.add_edge_with_attrs(u, v, AttrMap::new())
    }

    /// [`add_edge`](Self::add_edge) with an initial attribute dictionary.
    pub fn add_edge_with_attrs(
        &mut self,
        u: impl Into<String>,
        v: impl Into<String>,
        attrs: AttrMap,
    ) -> Result<(), TreeDataError> {
        let (u, v) = (u.into(), v.into());
        if self.contains_edge(&u, &v) {
            return Err(TreeDataError::DuplicateEdge(u, v));
        }
        if u == v {
            return Err(TreeDataError::CycleDetected(u, v));
        }
        if let Some(p) = self.parent(&v) {
            return Err(TreeDataError::MultipleParents {
                node: v.clone(),
                parent: p.to_string(),
            });
        }
        if self.ancestors(&u).any(|a| a == v) {
            return Err(TreeDataError::CycleDetected(u, v));
        }
        self.push_edge(u, v, attrs);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Unchecked insert; callers guarantee `v` has no parent and no cycle forms.
    fn push_edge(&mut self, u: String, v: String, attrs: AttrMap) {
        self.add_node(u.clone());
        self.add_node(v.clone());
        if let Some(ue) = self.nodes.get_mut(u.as_str()) {
            ue.children.push(v.clone());
        }
        if let Some(ve) = self.nodes.get_mut(v.as_str()) {
            ve.parent = Some(u.clone());
        }
        let key = EdgeKey(u, v);
        self.edges.insert(key.clone(), attrs);
        self.edge_order.push(key);
        self.bump();
    }

    /// Remove edge `u -> v`; `v` becomes a root.
    ///
    /// # Errors
    /// `MissingEdge` if absent.
    pub fn remove_edge(&mut self, u: &str, v: &str) -> Result<AttrMap, TreeDataError> {
        let attrs = self
            .edges
            .remove(&EdgeRef(u, v))
            .ok_or_else(|| TreeDataError::MissingEdge(u.to_string(), v.to_string()))?;
        self.edge_order.retain(|EdgeKey(a, b)| !(a == u && b == v));
        if let Some(ue) = self.nodes.get_mut(u) {
            ue.children.retain(|c| c != v);
        }
        if let Some(ve) = self.nodes.get_mut(v) {
            ve.parent = None;
        }
        self.bump();
        Ok(attrs)
    }

    pub fn node_attrs(&self, n: &str) -> Option<&AttrMap> {
        self.nodes.get(n).map(|e| &e.attrs)
    }

    pub fn node_attrs_mut(&mut self, n: &str) -> Option<&mut AttrMap> {
        self.nodes.get_mut(n).map(|e| &mut e.attrs)
    }

    pub fn node_attr(&self, n: &str, key: &str) -> Option<&Value> {
        self.node_attrs(n).and_then(|a| a.get(key))
    }

    /// Set `key = value` on node `n`, returning the previous value.
    ///
    /// # Errors
    /// `MissingNode` if `n` is absent.
    pub fn set_node_attr(
        &mut self,
        n: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, TreeDataError> {
        let attrs = self
            .node_attrs_mut(n)
            .ok_or_else(|| TreeDataError::MissingNode(n.to_string()))?;
        Ok(attrs.insert(key.into(), value.into()))
    }

    pub fn edge_attrs(&self, u: &str, v: &str) -> Option<&AttrMap> {
        self.edges.get(&EdgeRef(u, v))
    }

    pub fn edge_attrs_mut(&mut self, u: &str, v: &str) -> Option<&mut AttrMap> {
        self.edges.get_mut(&EdgeRef(u, v))
    }

    pub fn edge_attr(&self, u: &str, v: &str, key: &str) -> Option<&Value> {
        self.edge_attrs(u, v).and_then(|a| a.get(key))
    }

    /// Set `key = value` on edge `u -> v`, returning the previous value.
    ///
    /// # Errors
    /// `MissingEdge` if the edge is absent.
    pub fn set_edge_attr(
        &mut self,
        u: &str,
        v: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, TreeDataError> {
        let attrs = self
            .edge_attrs_mut(u, v)
            .ok_or_else(|| TreeDataError::MissingEdge(u.to_string(), v.to_string()))?;
        Ok(attrs.insert(key.into(), value.into()))
    }

    #[inline]
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl DebugInvariants for TreeGraph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "TreeGraph invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        if self.order.len() != self.nodes.len() {
            return Err(TreeDataError::ShapeMismatch {
                expected: (self.nodes.len(), 0),
                found: (self.order.len(), 0),
            });
        }
        for n in &self.order {
            if !self.nodes.contains_key(n.as_str()) {
                return Err(TreeDataError::MissingNode(n.clone()));
            }
        }
        if self.edge_order.len() != self.edges.len() {
            return Err(TreeDataError::ShapeMismatch {
                expected: (self.edges.len(), 1),
                found: (self.edge_order.len(), 1),
            });
        }
        for EdgeKey(u, v) in &self.edge_order {
            let mirrored = self.parent(v) == Some(u.as_str())
                && self.nodes.get(u.as_str()).is_some_and(|e| e.children.contains(v));
            if !mirrored {
                return Err(TreeDataError::MissingEdge(u.clone(), v.clone()));
            }
        }
        for n in &self.order {
            let mut steps = 0usize;
            for a in self.ancestors(n) {
                steps += 1;
                if steps > self.order.len() {
                    return Err(TreeDataError::CycleDetected(n.clone(), a.to_string()));
                }
            }
        }
        Ok(())
    }
}
