//! Annotated data container with lazy views and copy-on-write promotion.
//!
//! A [`TreeData`] pairs a primary matrix with per-axis tables and per-axis
//! tree annotations (`obst` keyed to observations, `vart` keyed to
//! variables). [`TreeData::select`] returns a *view*: it holds the owner's
//! store plus resolved positions and computes every read on demand. The first
//! mutating call on a view materializes an independent copy in one step, logs
//! a warning, and turns the view into an actual container.
//!
//! Trees read from a view come back as restricted [`GraphHandle`]s over the
//! owner's graph: attribute edits are shared, structural edits are rejected.
//!
//! # Example
//! ```rust
//! use tree_data::prelude::*;
//!
//! let leaves: Vec<String> = (7..15).map(|i| i.to_string()).collect();
//! let td = TreeData::new(
//!     Matrix::zeros(8, 2),
//!     Frame::from_labels(leaves).unwrap(),
//!     Frame::from_labels(["a", "b"]).unwrap(),
//! )
//! .unwrap()
//! .with_obst("tree", TreeGraph::balanced_tree(2, 3))
//! .unwrap();
//!
//! let view = td.select(Selector::labels(["7", "8", "11"]), ..).unwrap();
//! assert!(view.is_view());
//! assert_eq!(view.obst("tree").unwrap().edges().len(), 7);
//! ```

mod cow;
pub mod graph_handle;
pub mod options;
pub(crate) mod store;
pub(crate) mod view;

pub use graph_handle::GraphHandle;
pub use options::{ImplicitCopyHandling, TreeDataOptions};

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::algs::alignment::check_graph_alignment;
use crate::axis::{Axis, AxisKind, Selector};
use crate::data::frame::{Column, Frame};
use crate::data::matrix::Matrix;
use crate::debug_invariants::DebugInvariants;
use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

use store::Store;
use view::{ViewState, graph_kind};

enum Mode {
    /// Owns its store (which views taken from it share).
    Actual(Arc<RwLock<Store>>),
    /// Reads through to an owner's store.
    View(ViewState),
}

/// Matrix plus aligned per-axis tables and trees.
///
/// # Invariants
/// - `x` has shape `(obs.len(), var.len())`.
/// - Every `obst` graph contains every obs label; every `vart` graph every
///   var label. Extra nodes (internal ancestors) are allowed.
pub struct TreeData {
    mode: Mode,
    options: TreeDataOptions,
}

impl fmt::Debug for TreeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeData")
            .field("is_view", &self.is_view())
            .field("shape", &self.shape())
            .field("obst", &self.obst_keys())
            .field("vart", &self.vart_keys())
            .finish()
    }
}

impl TreeData {
    /// Actual container from a matrix and its two axis tables.
    ///
    /// # Errors
    /// `ShapeMismatch` if `x` is not `(obs.n_rows(), var.n_rows())`.
    pub fn new(x: Matrix, obs: Frame, var: Frame) -> Result<Self, TreeDataError> {
        let store = Store::new(x, obs, var)?;
        log::debug!("new TreeData of shape {:?}", store.x.shape());
        Ok(Self {
            mode: Mode::Actual(Arc::new(RwLock::new(store))),
            options: TreeDataOptions::default(),
        })
    }

    /// Actual container with default axes labelled `"0"`, `"1"`, ….
    pub fn from_matrix(x: Matrix) -> Self {
        let (r, c) = x.shape();
        let store = Store {
            x,
            obs: Frame::new(Axis::range(r)),
            var: Frame::new(Axis::range(c)),
            obst: Default::default(),
            vart: Default::default(),
        };
        Self {
            mode: Mode::Actual(Arc::new(RwLock::new(store))),
            options: TreeDataOptions::default(),
        }
    }

    /// Replace the options. Views taken afterwards inherit them.
    pub fn with_options(mut self, options: TreeDataOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder form of [`insert_obst`](Self::insert_obst).
    pub fn with_obst(mut self, key: impl Into<String>, graph: TreeGraph) -> Result<Self, TreeDataError> {
        self.insert_obst(key, graph)?;
        Ok(self)
    }

    /// Builder form of [`insert_vart`](Self::insert_vart).
    pub fn with_vart(mut self, key: impl Into<String>, graph: TreeGraph) -> Result<Self, TreeDataError> {
        self.insert_vart(key, graph)?;
        Ok(self)
    }

    #[inline]
    pub fn is_view(&self) -> bool {
        matches!(self.mode, Mode::View(_))
    }

    #[inline]
    pub fn options(&self) -> TreeDataOptions {
        self.options
    }

    /// `(n_obs, n_vars)`.
    pub fn shape(&self) -> (usize, usize) {
        match &self.mode {
            Mode::Actual(store) => store.read().x.shape(),
            Mode::View(view) => view.shape(),
        }
    }

    pub fn n_obs(&self) -> usize {
        self.shape().0
    }

    pub fn n_vars(&self) -> usize {
        self.shape().1
    }

    pub fn obs_names(&self) -> Vec<String> {
        self.names(AxisKind::Obs)
    }

    pub fn var_names(&self) -> Vec<String> {
        self.names(AxisKind::Var)
    }

    fn names(&self, kind: AxisKind) -> Vec<String> {
        match &self.mode {
            Mode::Actual(store) => store.read().frame(kind).index().labels().to_vec(),
            Mode::View(view) => view.labels(kind),
        }
    }

    /// The `kind` axis as currently seen by this container.
    pub(crate) fn axis(&self, kind: AxisKind) -> Result<Arc<Axis>, TreeDataError> {
        match &self.mode {
            Mode::Actual(store) => Ok(store.read().frame(kind).shared_index()),
            Mode::View(view) => view.axis(kind).map(Arc::new),
        }
    }

    /// Owned copy of the primary matrix.
    pub fn x(&self) -> Result<Matrix, TreeDataError> {
        match &self.mode {
            Mode::Actual(store) => Ok(store.read().x.clone()),
            Mode::View(view) => view.x(),
        }
    }

    /// Single matrix entry, `None` if out of range.
    pub fn x_value(&self, row: usize, col: usize) -> Option<f64> {
        match &self.mode {
            Mode::Actual(store) => store.read().x.get(row, col),
            Mode::View(view) => view.x_value(row, col),
        }
    }

    /// Owned copy of the observation table.
    pub fn obs(&self) -> Result<Frame, TreeDataError> {
        self.frame(AxisKind::Obs)
    }

    /// Owned copy of the variable table.
    pub fn var(&self) -> Result<Frame, TreeDataError> {
        self.frame(AxisKind::Var)
    }

    fn frame(&self, kind: AxisKind) -> Result<Frame, TreeDataError> {
        match &self.mode {
            Mode::Actual(store) => Ok(store.read().frame(kind).clone()),
            Mode::View(view) => view.frame(kind),
        }
    }

    /// Observation column `name`, in this container's row order.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such column.
    pub fn obs_column(&self, name: &str) -> Result<Column, TreeDataError> {
        self.column(AxisKind::Obs, name)
    }

    /// Variable column `name`, in this container's column order.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such column.
    pub fn var_column(&self, name: &str) -> Result<Column, TreeDataError> {
        self.column(AxisKind::Var, name)
    }

    fn column(&self, kind: AxisKind, name: &str) -> Result<Column, TreeDataError> {
        let found = match &self.mode {
            Mode::Actual(store) => store.read().frame(kind).column(name).cloned(),
            Mode::View(view) => view.column(kind, name),
        };
        found.ok_or_else(|| TreeDataError::UnknownKey {
            kind: column_kind(kind),
            name: name.to_string(),
        })
    }

    /// Observation tree `key`.
    ///
    /// On an actual container the handle is unrestricted. On a view it is
    /// restricted to the ancestor-preserving subset of the view's
    /// observations and aliases the owner's graph.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such tree.
    pub fn obst(&self, key: &str) -> Result<GraphHandle, TreeDataError> {
        self.graph(AxisKind::Obs, key)
    }

    /// Variable tree `key`; see [`obst`](Self::obst).
    pub fn vart(&self, key: &str) -> Result<GraphHandle, TreeDataError> {
        self.graph(AxisKind::Var, key)
    }

    fn graph(&self, kind: AxisKind, key: &str) -> Result<GraphHandle, TreeDataError> {
        match &self.mode {
            Mode::Actual(store) => {
                let store = store.read();
                let graph = store
                    .graphs(kind)
                    .get(key)
                    .cloned()
                    .ok_or_else(|| TreeDataError::UnknownKey {
                        kind: graph_kind(kind),
                        name: key.to_string(),
                    })?;
                Ok(GraphHandle::owned(graph, kind, key, store.frame(kind).shared_index()))
            }
            Mode::View(view) => {
                let (graph, subset) = view.graph(kind, key, self.options.empty_subset)?;
                Ok(GraphHandle::restricted(graph, subset))
            }
        }
    }

    pub fn obst_keys(&self) -> Vec<String> {
        self.graph_keys(AxisKind::Obs)
    }

    pub fn vart_keys(&self) -> Vec<String> {
        self.graph_keys(AxisKind::Var)
    }

    fn graph_keys(&self, kind: AxisKind) -> Vec<String> {
        match &self.mode {
            Mode::Actual(store) => store.read().graphs(kind).keys().cloned().collect(),
            Mode::View(view) => view.graph_keys(kind),
        }
    }

    /// View restricted to `obs` rows and `var` columns.
    ///
    /// Each selector is resolved independently against this container's
    /// axes. Selecting from a view composes the positions onto the owner, so
    /// every view reads straight from an actual store.
    ///
    /// # Errors
    /// `Selector` if either selector does not resolve.
    pub fn select(
        &self,
        obs: impl Into<Selector>,
        var: impl Into<Selector>,
    ) -> Result<TreeData, TreeDataError> {
        let (obs, var) = (obs.into(), var.into());
        let (parent, obs_pos, var_pos) = match &self.mode {
            Mode::Actual(store) => {
                let s = store.read();
                let o = obs.resolve(s.obs.index(), AxisKind::Obs)?;
                let v = var.resolve(s.var.index(), AxisKind::Var)?;
                (Arc::clone(store), o, v)
            }
            Mode::View(view) => {
                let o = compose(view, &obs, AxisKind::Obs)?;
                let v = compose(view, &var, AxisKind::Var)?;
                (Arc::clone(&view.parent), o, v)
            }
        };
        log::debug!("select: view of shape ({}, {})", obs_pos.len(), var_pos.len());
        Ok(TreeData {
            mode: Mode::View(ViewState::new(parent, obs_pos, var_pos)),
            options: self.options,
        })
    }

    /// Independent actual copy. The receiver keeps its mode.
    pub fn copy(&self) -> Result<TreeData, TreeDataError> {
        let store = match &self.mode {
            Mode::Actual(store) => store.read().deep_copy(),
            Mode::View(view) => view.materialize(self.options.empty_subset)?,
        };
        Ok(self.with_store(store))
    }

    /// Independent actual copy with observations and variables swapped.
    pub fn transpose(&self) -> Result<TreeData, TreeDataError> {
        let store = match &self.mode {
            Mode::Actual(store) => store.read().transposed(),
            Mode::View(view) => view.materialize(self.options.empty_subset)?.transposed(),
        };
        Ok(self.with_store(store))
    }

    fn with_store(&self, store: Store) -> TreeData {
        TreeData {
            mode: Mode::Actual(Arc::new(RwLock::new(store))),
            options: self.options,
        }
    }

    /// Ensure `graph` covers this container's `kind` axis.
    fn check_alignment(&self, kind: AxisKind, key: &str, graph: &TreeGraph) -> Result<(), TreeDataError> {
        let axis = self.axis(kind)?;
        check_graph_alignment(&axis, kind, key, graph)
    }
}

/// Resolve `selector` against the view's own axis and map the result back
/// onto the owner's positions.
fn compose(view: &ViewState, selector: &Selector, kind: AxisKind) -> Result<Vec<usize>, TreeDataError> {
    let positions = view.positions(kind);
    if selector.is_full() {
        return Ok(positions.to_vec());
    }
    let axis = view.axis(kind)?;
    let local = selector.resolve(&axis, kind)?;
    Ok(local.into_iter().map(|p| positions[p]).collect())
}

fn column_kind(kind: AxisKind) -> &'static str {
    match kind {
        AxisKind::Obs => "obs column",
        AxisKind::Var => "var column",
    }
}

impl DebugInvariants for TreeData {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "TreeData invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        match &self.mode {
            Mode::Actual(store) => store.read().validate_invariants(),
            Mode::View(view) => view.validate_invariants(),
        }
    }
}
