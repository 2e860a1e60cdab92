//! Owned backing store of an actual container.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::algs::alignment::check_graph_alignment;
use crate::axis::AxisKind;
use crate::data::frame::Frame;
use crate::data::matrix::Matrix;
use crate::debug_invariants::DebugInvariants;
use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

/// A graph shared between an owner and the views taken from it.
pub(crate) type SharedGraph = Arc<RwLock<TreeGraph>>;

/// Graphs keyed to one axis, by name.
pub(crate) type AxisGraphs = BTreeMap<String, SharedGraph>;

/// Matrix, per-axis tables and per-axis graphs, all aligned.
#[derive(Debug)]
pub(crate) struct Store {
    pub(crate) x: Matrix,
    pub(crate) obs: Frame,
    pub(crate) var: Frame,
    pub(crate) obst: AxisGraphs,
    pub(crate) vart: AxisGraphs,
}

impl Store {
    pub(crate) fn new(x: Matrix, obs: Frame, var: Frame) -> Result<Self, TreeDataError> {
        let expected = (obs.n_rows(), var.n_rows());
        if x.shape() != expected {
            return Err(TreeDataError::ShapeMismatch {
                expected,
                found: x.shape(),
            });
        }
        Ok(Self {
            x,
            obs,
            var,
            obst: AxisGraphs::new(),
            vart: AxisGraphs::new(),
        })
    }

    pub(crate) fn frame(&self, kind: AxisKind) -> &Frame {
        match kind {
            AxisKind::Obs => &self.obs,
            AxisKind::Var => &self.var,
        }
    }

    pub(crate) fn frame_mut(&mut self, kind: AxisKind) -> &mut Frame {
        match kind {
            AxisKind::Obs => &mut self.obs,
            AxisKind::Var => &mut self.var,
        }
    }

    pub(crate) fn graphs(&self, kind: AxisKind) -> &AxisGraphs {
        match kind {
            AxisKind::Obs => &self.obst,
            AxisKind::Var => &self.vart,
        }
    }

    pub(crate) fn graphs_mut(&mut self, kind: AxisKind) -> &mut AxisGraphs {
        match kind {
            AxisKind::Obs => &mut self.obst,
            AxisKind::Var => &mut self.vart,
        }
    }

    /// Fully independent copy: new matrix, tables and graph allocations.
    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            x: self.x.clone(),
            obs: self.obs.clone(),
            var: self.var.clone(),
            obst: copy_graphs(&self.obst),
            vart: copy_graphs(&self.vart),
        }
    }

    /// Independent copy with the two axes swapped.
    pub(crate) fn transposed(&self) -> Self {
        Self {
            x: self.x.transpose(),
            obs: self.var.clone(),
            var: self.obs.clone(),
            obst: copy_graphs(&self.vart),
            vart: copy_graphs(&self.obst),
        }
    }
}

fn copy_graphs(graphs: &AxisGraphs) -> AxisGraphs {
    graphs
        .iter()
        .map(|(key, g)| (key.clone(), Arc::new(RwLock::new(g.read().clone()))))
        .collect()
}

impl DebugInvariants for Store {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Store invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        let expected = (self.obs.n_rows(), self.var.n_rows());
        if self.x.shape() != expected {
            return Err(TreeDataError::ShapeMismatch {
                expected,
                found: self.x.shape(),
            });
        }
        self.x.validate_invariants()?;
        for kind in [AxisKind::Obs, AxisKind::Var] {
            let frame = self.frame(kind);
            frame.validate_invariants()?;
            for (key, g) in self.graphs(kind) {
                let g = g.read();
                g.validate_invariants()?;
                check_graph_alignment(frame.index(), kind, key, &g)?;
            }
        }
        Ok(())
    }
}
