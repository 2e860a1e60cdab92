//! Copy-on-write promotion and the container's mutators.
//!
//! Every mutator validates its input against what the receiver currently
//! shows, then promotes a view (if needed), then applies the change. A
//! rejected call therefore leaves the receiver in its original mode.

use std::sync::Arc;

use parking_lot::RwLock;

use super::options::ImplicitCopyHandling;
use super::store::Store;
use super::view::graph_kind;
use super::{Mode, TreeData, column_kind};
use crate::algs::alignment::check_frame_alignment;
use crate::axis::AxisKind;
use crate::data::frame::{Column, Frame};
use crate::data::matrix::Matrix;
use crate::debug_invariants::DebugInvariants;
use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

impl TreeData {
    /// Store to write into, materializing a view first.
    ///
    /// Matrix, tables and every tree are snapshotted from the owner before
    /// the mode changes; a failed snapshot leaves the view untouched.
    fn promote(&mut self, op: &'static str) -> Result<Arc<RwLock<Store>>, TreeDataError> {
        let view = match &self.mode {
            Mode::Actual(store) => return Ok(Arc::clone(store)),
            Mode::View(view) => view,
        };
        let store = view.materialize(self.options.empty_subset)?;
        let (r, c) = store.x.shape();
        match self.options.implicit_copy {
            ImplicitCopyHandling::Warn => log::warn!(
                "{op} on a view: materializing an independent ({r}, {c}) copy"
            ),
            ImplicitCopyHandling::Ignore => {
                log::debug!("{op} on a view: materialized ({r}, {c}) copy")
            }
        }
        let store = Arc::new(RwLock::new(store));
        self.mode = Mode::Actual(Arc::clone(&store));
        Ok(store)
    }

    /// Add or replace observation column `name`.
    ///
    /// Returns the replaced column, if any.
    ///
    /// # Errors
    /// `ColumnLengthMismatch` unless the column has `n_obs()` entries.
    pub fn set_obs_column(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Option<Column>, TreeDataError> {
        self.set_column(AxisKind::Obs, name.into(), column.into(), "set_obs_column")
    }

    /// Add or replace variable column `name`.
    ///
    /// # Errors
    /// `ColumnLengthMismatch` unless the column has `n_vars()` entries.
    pub fn set_var_column(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Option<Column>, TreeDataError> {
        self.set_column(AxisKind::Var, name.into(), column.into(), "set_var_column")
    }

    fn set_column(
        &mut self,
        kind: AxisKind,
        name: String,
        column: Column,
        op: &'static str,
    ) -> Result<Option<Column>, TreeDataError> {
        let expected = match kind {
            AxisKind::Obs => self.n_obs(),
            AxisKind::Var => self.n_vars(),
        };
        if column.len() != expected {
            return Err(TreeDataError::ColumnLengthMismatch {
                name,
                expected,
                found: column.len(),
            });
        }
        let store = self.promote(op)?;
        let mut store = store.write();
        store.frame_mut(kind).insert_column(name, column)
    }

    /// Replace the observation table.
    ///
    /// `frame` may carry rows for labels this container does not hold; it is
    /// reindexed to the observations, in order.
    ///
    /// # Errors
    /// `Alignment` if `frame` lacks any observation label.
    pub fn set_obs(&mut self, frame: Frame) -> Result<(), TreeDataError> {
        self.set_frame(AxisKind::Obs, frame, "set_obs")
    }

    /// Replace the variable table; see [`set_obs`](Self::set_obs).
    ///
    /// # Errors
    /// `Alignment` if `frame` lacks any variable label.
    pub fn set_var(&mut self, frame: Frame) -> Result<(), TreeDataError> {
        self.set_frame(AxisKind::Var, frame, "set_var")
    }

    fn set_frame(&mut self, kind: AxisKind, frame: Frame, op: &'static str) -> Result<(), TreeDataError> {
        let axis = self.axis(kind)?;
        check_frame_alignment(&axis, kind, "table", &frame)?;
        let frame = frame.take_labels(axis.labels().iter().map(String::as_str))?;
        let store = self.promote(op)?;
        *store.write().frame_mut(kind) = frame;
        Ok(())
    }

    /// Remove observation column `name`.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such column.
    pub fn remove_obs_column(&mut self, name: &str) -> Result<Column, TreeDataError> {
        self.remove_column(AxisKind::Obs, name, "remove_obs_column")
    }

    /// Remove variable column `name`.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such column.
    pub fn remove_var_column(&mut self, name: &str) -> Result<Column, TreeDataError> {
        self.remove_column(AxisKind::Var, name, "remove_var_column")
    }

    fn remove_column(&mut self, kind: AxisKind, name: &str, op: &'static str) -> Result<Column, TreeDataError> {
        let unknown = || TreeDataError::UnknownKey {
            kind: column_kind(kind),
            name: name.to_string(),
        };
        // go through the read path so a view reports the same error
        self.column(kind, name)?;
        let store = self.promote(op)?;
        let mut store = store.write();
        store.frame_mut(kind).remove_column(name).ok_or_else(unknown)
    }

    /// Replace the primary matrix.
    ///
    /// # Errors
    /// `ShapeMismatch` unless `x` has this container's shape.
    pub fn set_x(&mut self, x: Matrix) -> Result<(), TreeDataError> {
        if x.shape() != self.shape() {
            return Err(TreeDataError::ShapeMismatch {
                expected: self.shape(),
                found: x.shape(),
            });
        }
        let store = self.promote("set_x")?;
        store.write().x = x;
        Ok(())
    }

    /// Overwrite one matrix entry.
    ///
    /// # Errors
    /// `ShapeMismatch` if the cell is outside the matrix.
    pub fn set_x_value(&mut self, row: usize, col: usize, value: f64) -> Result<(), TreeDataError> {
        let (r, c) = self.shape();
        if row >= r || col >= c {
            return Err(TreeDataError::ShapeMismatch {
                expected: (r, c),
                found: (row.saturating_add(1), col.saturating_add(1)),
            });
        }
        let store = self.promote("set_x_value")?;
        store.write().x.set(row, col, value)
    }

    /// Add or replace observation tree `key`.
    ///
    /// # Errors
    /// `Alignment` if `graph` lacks any observation label.
    pub fn insert_obst(&mut self, key: impl Into<String>, graph: TreeGraph) -> Result<(), TreeDataError> {
        self.insert_graph(AxisKind::Obs, key.into(), graph, "insert_obst")
    }

    /// Add or replace variable tree `key`.
    ///
    /// # Errors
    /// `Alignment` if `graph` lacks any variable label.
    pub fn insert_vart(&mut self, key: impl Into<String>, graph: TreeGraph) -> Result<(), TreeDataError> {
        self.insert_graph(AxisKind::Var, key.into(), graph, "insert_vart")
    }

    fn insert_graph(
        &mut self,
        kind: AxisKind,
        key: String,
        graph: TreeGraph,
        op: &'static str,
    ) -> Result<(), TreeDataError> {
        self.check_alignment(kind, &key, &graph)?;
        let store = self.promote(op)?;
        let mut store = store.write();
        log::debug!("{op}: `{key}` with {} nodes", graph.node_count());
        store
            .graphs_mut(kind)
            .insert(key, Arc::new(RwLock::new(graph)));
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        store.debug_assert_invariants();
        Ok(())
    }

    /// Remove observation tree `key` and return it.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such tree.
    pub fn remove_obst(&mut self, key: &str) -> Result<TreeGraph, TreeDataError> {
        self.remove_graph(AxisKind::Obs, key, "remove_obst")
    }

    /// Remove variable tree `key` and return it.
    ///
    /// # Errors
    /// `UnknownKey` if there is no such tree.
    pub fn remove_vart(&mut self, key: &str) -> Result<TreeGraph, TreeDataError> {
        self.remove_graph(AxisKind::Var, key, "remove_vart")
    }

    fn remove_graph(&mut self, kind: AxisKind, key: &str, op: &'static str) -> Result<TreeGraph, TreeDataError> {
        let unknown = || TreeDataError::UnknownKey {
            kind: graph_kind(kind),
            name: key.to_string(),
        };
        if !self.graph_keys(kind).iter().any(|k| k == key) {
            return Err(unknown());
        }
        let store = self.promote(op)?;
        let removed = store.write().graphs_mut(kind).remove(key).ok_or_else(unknown)?;
        // views of this container may still hold the graph
        Ok(Arc::try_unwrap(removed).map_or_else(|shared| shared.read().clone(), RwLock::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Selector;
    use crate::container::TreeDataOptions;
    use crate::data::frame::Frame;

    fn fixture() -> TreeData {
        let leaves: Vec<String> = (7..15).map(|i| i.to_string()).collect();
        let obs = Frame::from_labels(leaves)
            .unwrap()
            .with_column("anno", 0..8i64)
            .unwrap();
        let var = Frame::from_labels(["a", "b"]).unwrap();
        TreeData::new(Matrix::zeros(8, 2), obs, var)
            .unwrap()
            .with_obst("tree", TreeGraph::balanced_tree(2, 3))
            .unwrap()
    }

    #[test]
    fn mutation_promotes_view() {
        let td = fixture();
        let mut v = td.select(Selector::positions([0, 1, 4]), ..).unwrap();
        assert!(v.is_view());
        v.set_obs_column("new", vec![1.0, 2.0, 3.0]).unwrap();
        assert!(!v.is_view());
        assert_eq!(v.obs_names(), vec!["7", "8", "11"]);
        assert!(td.obs_column("new").is_err(), "parent must not see the new column");
        let tree = v.obst("tree").unwrap();
        assert!(!tree.is_restricted());
        assert_eq!(tree.node_count(), 8);
    }

    #[test]
    fn rejected_mutation_keeps_view() {
        let td = fixture();
        let mut v = td.select(Selector::range(0..3), ..).unwrap();
        assert!(v.set_obs_column("bad", vec![1.0]).is_err());
        assert!(v.set_x(Matrix::zeros(8, 2)).is_err());
        assert!(v.set_x_value(3, 0, 1.0).is_err());
        assert!(v.remove_obst("nope").is_err());
        assert!(v.remove_obs_column("nope").is_err());
        let small = TreeGraph::from_edges([("0", "7")]).unwrap();
        assert!(matches!(
            v.insert_obst("small", small),
            Err(TreeDataError::Alignment { .. })
        ));
        assert!(v.is_view());
    }

    #[test]
    fn set_obs_reindexes_a_superset_table() {
        let td = fixture();
        let mut v = td.select(Selector::labels(["11", "7"]), ..).unwrap();
        let wide = Frame::from_labels(["7", "99", "11", "8"])
            .unwrap()
            .with_column("score", vec![0.5, 9.0, 1.5, 2.5])
            .unwrap();
        v.set_obs(wide).unwrap();
        assert!(!v.is_view());
        assert_eq!(v.obs_names(), vec!["11", "7"]);
        assert_eq!(v.obs_column("score").unwrap(), Column::Float(vec![1.5, 0.5]));
        assert!(v.obs_column("anno").is_err());
        assert!(td.obs_column("score").is_err());
    }

    #[test]
    fn set_var_rejects_missing_labels_without_promoting() {
        let td = fixture();
        let mut v = td.select(.., Selector::range(0..2)).unwrap();
        let err = v.set_var(Frame::from_labels(["b"]).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "var annotation `table` is missing axis labels: [a]");
        assert!(v.is_view());
    }

    #[test]
    fn set_x_value_out_of_range_is_an_error() {
        let mut td = fixture();
        assert_eq!(
            td.set_x_value(usize::MAX, 0, 1.0),
            Err(TreeDataError::ShapeMismatch {
                expected: (8, 2),
                found: (usize::MAX, 1),
            })
        );
        let mut v = td.select(Selector::range(0..2), ..).unwrap();
        assert!(v.set_x_value(0, usize::MAX, 1.0).is_err());
        assert!(v.is_view());
    }

    #[test]
    fn set_x_value_on_view_leaves_parent() {
        let td = fixture();
        let mut v = td.select(Selector::Position(2), Selector::Label("b".into())).unwrap();
        v.set_x_value(0, 0, 5.0).unwrap();
        assert_eq!(v.x_value(0, 0), Some(5.0));
        assert_eq!(td.x_value(2, 1), Some(0.0));
    }

    #[test]
    fn insert_on_view_checks_view_axis() {
        let td = fixture();
        let mut v = td.select(Selector::labels(["7", "8"]), ..).unwrap();
        // covers the view's labels only; fine for the view, not for the owner
        let small = TreeGraph::from_edges([("r", "7"), ("r", "8")]).unwrap();
        v.insert_obst("small", small).unwrap();
        assert!(!v.is_view());
        assert_eq!(v.obst_keys(), vec!["small", "tree"]);
        assert_eq!(td.obst_keys(), vec!["tree"]);
    }

    #[test]
    fn remove_obst_returns_graph() {
        let mut td = fixture();
        let v = td.select(Selector::range(0..2), ..).unwrap();
        let g = td.remove_obst("tree").unwrap();
        assert_eq!(g.node_count(), 15);
        assert!(td.obst_keys().is_empty());
        assert!(matches!(v.obst("tree"), Err(TreeDataError::UnknownKey { .. })));
    }

    #[test]
    fn ignore_handling_still_promotes() {
        let td = fixture().with_options(
            TreeDataOptions::default().with_implicit_copy(ImplicitCopyHandling::Ignore),
        );
        let mut v = td.select(Selector::range(0..2), ..).unwrap();
        v.remove_obs_column("anno").unwrap();
        assert!(!v.is_view());
        assert!(td.obs_column("anno").is_ok());
    }
}
