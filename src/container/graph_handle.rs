//! Capability-restricted access to a container's tree annotations.
//!
//! A [`GraphHandle`] is returned for every graph read from a container:
//!
//! - from an actual container it is an **owned** handle: full read access,
//!   attribute edits and structural edits (nodes keyed to the axis cannot be
//!   removed);
//! - from a view it is a **restricted** handle over the *parent's* graph
//!   storage: reads see only the view's ancestor-preserving subset, attribute
//!   edits write straight through to the parent graph, and structural edits
//!   are rejected with [`TreeDataError::StructuralMutation`].

use std::fmt;
use std::sync::Arc;

use crate::algs::subset::{NodeSubset, subset_tree};
use crate::axis::{Axis, AxisKind};
use crate::container::store::SharedGraph;
use crate::topology::tree::TreeGraph;
use crate::topology::value::{AttrMap, Value};
use crate::tree_error::TreeDataError;

enum Access {
    Owned {
        kind: AxisKind,
        key: String,
        pinned: Arc<Axis>,
    },
    Restricted(Arc<NodeSubset>),
}

/// Handle to a named tree annotation of a container.
pub struct GraphHandle {
    graph: SharedGraph,
    access: Access,
}

impl fmt::Debug for GraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphHandle")
            .field("restricted", &self.is_restricted())
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl GraphHandle {
    pub(crate) fn owned(graph: SharedGraph, kind: AxisKind, key: &str, pinned: Arc<Axis>) -> Self {
        Self {
            graph,
            access: Access::Owned {
                kind,
                key: key.to_string(),
                pinned,
            },
        }
    }

    pub(crate) fn restricted(graph: SharedGraph, subset: Arc<NodeSubset>) -> Self {
        Self {
            graph,
            access: Access::Restricted(subset),
        }
    }

    /// Whether this handle came from a view (structural edits rejected).
    pub fn is_restricted(&self) -> bool {
        matches!(self.access, Access::Restricted(_))
    }

    /// Whether both handles point at the same underlying graph storage.
    pub fn same_graph(&self, other: &GraphHandle) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph)
    }

    /// Structural version of the underlying graph.
    pub fn version(&self) -> u64 {
        self.graph.read().version()
    }

    fn visible(&self, n: &str) -> bool {
        match &self.access {
            Access::Owned { .. } => true,
            Access::Restricted(subset) => subset.contains(n),
        }
    }

    fn check_node(&self, g: &TreeGraph, n: &str) -> Result<(), TreeDataError> {
        if !g.contains_node(n) {
            return Err(TreeDataError::MissingNode(n.to_string()));
        }
        if !self.visible(n) {
            return Err(TreeDataError::NodeOutsideView(n.to_string()));
        }
        Ok(())
    }

    fn check_edge(&self, g: &TreeGraph, u: &str, v: &str) -> Result<(), TreeDataError> {
        if !g.contains_edge(u, v) {
            return Err(TreeDataError::MissingEdge(u.to_string(), v.to_string()));
        }
        self.check_node(g, u)?;
        self.check_node(g, v)
    }

    fn reject(&self, op: &'static str) -> Result<(), TreeDataError> {
        match self.access {
            Access::Restricted(_) => {
                log::debug!("rejected {op} on view graph");
                Err(TreeDataError::StructuralMutation(op))
            }
            Access::Owned { .. } => Ok(()),
        }
    }

    // --- reads ---

    /// Visible nodes in the graph's insertion order.
    pub fn nodes(&self) -> Vec<String> {
        let g = self.graph.read();
        g.nodes()
            .filter(|n| self.visible(n))
            .map(str::to_string)
            .collect()
    }

    /// Visible edges in the graph's edge insertion order.
    pub fn edges(&self) -> Vec<(String, String)> {
        let g = self.graph.read();
        g.edges()
            .filter(|(u, v)| self.visible(u) && self.visible(v))
            .map(|(u, v)| (u.to_string(), v.to_string()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        match &self.access {
            Access::Owned { .. } => self.graph.read().node_count(),
            Access::Restricted(subset) => subset.len(),
        }
    }

    pub fn edge_count(&self) -> usize {
        let g = self.graph.read();
        match &self.access {
            Access::Owned { .. } => g.edge_count(),
            Access::Restricted(subset) => subset.edges(&g).count(),
        }
    }

    pub fn contains_node(&self, n: &str) -> bool {
        self.visible(n) && self.graph.read().contains_node(n)
    }

    pub fn contains_edge(&self, u: &str, v: &str) -> bool {
        self.visible(u) && self.visible(v) && self.graph.read().contains_edge(u, v)
    }

    /// Parent of `n` (always visible when `n` is).
    pub fn parent(&self, n: &str) -> Result<Option<String>, TreeDataError> {
        let g = self.graph.read();
        self.check_node(&g, n)?;
        Ok(g.parent(n).map(str::to_string))
    }

    /// Visible children of `n`.
    pub fn children(&self, n: &str) -> Result<Vec<String>, TreeDataError> {
        let g = self.graph.read();
        self.check_node(&g, n)?;
        Ok(g.children(n)
            .filter(|c| self.visible(c))
            .map(str::to_string)
            .collect())
    }

    /// Visible nodes with no visible children.
    pub fn leaves(&self) -> Vec<String> {
        let g = self.graph.read();
        g.nodes()
            .filter(|n| self.visible(n) && !g.children(n).any(|c| self.visible(c)))
            .map(str::to_string)
            .collect()
    }

    /// The single root of the visible tree.
    ///
    /// # Errors
    /// `NoRoot` when nothing is visible, `MultipleRoots` for a forest.
    pub fn root(&self) -> Result<String, TreeDataError> {
        let g = self.graph.read();
        let roots: Vec<String> = g
            .nodes()
            .filter(|n| self.visible(n) && g.parent(n).is_none_or(|p| !self.visible(p)))
            .map(str::to_string)
            .collect();
        match roots.len() {
            0 => Err(TreeDataError::NoRoot),
            1 => Ok(roots.into_iter().next().unwrap_or_default()),
            _ => Err(TreeDataError::MultipleRoots(roots)),
        }
    }

    pub fn node_attr(&self, n: &str, key: &str) -> Result<Option<Value>, TreeDataError> {
        let g = self.graph.read();
        self.check_node(&g, n)?;
        Ok(g.node_attr(n, key).cloned())
    }

    pub fn node_attrs(&self, n: &str) -> Result<AttrMap, TreeDataError> {
        let g = self.graph.read();
        self.check_node(&g, n)?;
        Ok(g.node_attrs(n).cloned().unwrap_or_default())
    }

    pub fn edge_attr(&self, u: &str, v: &str, key: &str) -> Result<Option<Value>, TreeDataError> {
        let g = self.graph.read();
        self.check_edge(&g, u, v)?;
        Ok(g.edge_attr(u, v, key).cloned())
    }

    /// Owned deep copy of the visible graph.
    pub fn to_owned_graph(&self) -> TreeGraph {
        let g = self.graph.read();
        match &self.access {
            Access::Owned { .. } => g.clone(),
            Access::Restricted(subset) => subset_tree(&g, subset),
        }
    }

    // --- attribute edits (allowed on every handle) ---

    /// Set `key = value` on node `n`. Through a view this edits the parent's
    /// graph in place.
    pub fn set_node_attr(
        &self,
        n: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, TreeDataError> {
        let mut g = self.graph.write();
        self.check_node(&g, n)?;
        g.set_node_attr(n, key, value)
    }

    /// Set `key = value` on every visible node.
    pub fn set_node_attrs_all(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut g = self.graph.write();
        let targets: Vec<String> = g
            .nodes()
            .filter(|n| self.visible(n))
            .map(str::to_string)
            .collect();
        for n in targets {
            if let Some(attrs) = g.node_attrs_mut(&n) {
                attrs.insert(key.to_string(), value.clone());
            }
        }
    }

    /// Set `key` per node from `values`; nothing is written unless every
    /// node is visible.
    pub fn set_node_attr_values<I, S, V>(&self, key: &str, values: I) -> Result<(), TreeDataError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let values: Vec<(S, Value)> = values.into_iter().map(|(n, v)| (n, v.into())).collect();
        let mut g = self.graph.write();
        for (n, _) in &values {
            self.check_node(&g, n.as_ref())?;
        }
        for (n, v) in values {
            g.set_node_attr(n.as_ref(), key, v)?;
        }
        Ok(())
    }

    pub fn set_edge_attr(
        &self,
        u: &str,
        v: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, TreeDataError> {
        let mut g = self.graph.write();
        self.check_edge(&g, u, v)?;
        g.set_edge_attr(u, v, key, value)
    }

    // --- structural edits (owned handles only) ---

    /// Add node `n`. Returns `true` if it was new.
    ///
    /// # Errors
    /// `StructuralMutation` through a view.
    pub fn add_node(&self, n: impl Into<String>) -> Result<bool, TreeDataError> {
        self.reject("add_node on view graph")?;
        Ok(self.graph.write().add_node(n))
    }

    /// Remove node `n` and its incident edges.
    ///
    /// # Errors
    /// `StructuralMutation` through a view; `Alignment` if `n` is a label of
    /// the axis the graph is keyed to; `MissingNode` if absent.
    pub fn remove_node(&self, n: &str) -> Result<AttrMap, TreeDataError> {
        self.reject("remove_node on view graph")?;
        if let Access::Owned { kind, key, pinned } = &self.access {
            if pinned.contains(n) {
                return Err(TreeDataError::Alignment {
                    axis: *kind,
                    key: key.clone(),
                    missing: vec![n.to_string()],
                });
            }
        }
        self.graph.write().remove_node(n)
    }

    /// Add edge `u -> v`.
    ///
    /// # Errors
    /// `StructuralMutation` through a view, or the graph's own edge errors.
    pub fn add_edge(&self, u: impl Into<String>, v: impl Into<String>) -> Result<(), TreeDataError> {
        self.reject("add_edge on view graph")?;
        self.graph.write().add_edge(u, v)
    }

    /// Remove edge `u -> v`.
    ///
    /// # Errors
    /// `StructuralMutation` through a view; `MissingEdge` if absent.
    pub fn remove_edge(&self, u: &str, v: &str) -> Result<AttrMap, TreeDataError> {
        self.reject("remove_edge on view graph")?;
        self.graph.write().remove_edge(u, v)
    }
}
