//! View state: a parent store plus resolved positions per axis.
//!
//! Reads are computed on demand from the parent. Tree subsets are cached per
//! graph and keyed by the graph's identity, its structural version and the
//! empty-subset policy, so a structural edit, a replaced graph or a changed
//! policy is picked up by the next read. Attribute values are never cached;
//! they are read live.

use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use crate::algs::subset::{EmptySubsetPolicy, NodeSubset, ancestor_closure, subset_tree};
use crate::axis::{Axis, AxisKind};
use crate::container::store::{AxisGraphs, SharedGraph, Store};
use crate::data::frame::{Column, Frame};
use crate::data::matrix::Matrix;
use crate::debug_invariants::DebugInvariants;
use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

#[derive(Debug)]
struct CachedSubset {
    graph: Weak<RwLock<TreeGraph>>,
    version: u64,
    policy: EmptySubsetPolicy,
    subset: Arc<NodeSubset>,
}

#[derive(Debug)]
pub(crate) struct ViewState {
    pub(crate) parent: Arc<RwLock<Store>>,
    obs: Vec<usize>,
    var: Vec<usize>,
    cache: Mutex<HashMap<(AxisKind, String), CachedSubset>>,
}

impl ViewState {
    /// Positions must already be resolved against the parent's axes.
    pub(crate) fn new(parent: Arc<RwLock<Store>>, obs: Vec<usize>, var: Vec<usize>) -> Self {
        Self {
            parent,
            obs,
            var,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn positions(&self, kind: AxisKind) -> &[usize] {
        match kind {
            AxisKind::Obs => &self.obs,
            AxisKind::Var => &self.var,
        }
    }

    pub(crate) fn shape(&self) -> (usize, usize) {
        (self.obs.len(), self.var.len())
    }

    /// Labels of this view's `kind` axis, in view order.
    pub(crate) fn labels(&self, kind: AxisKind) -> Vec<String> {
        let store = self.parent.read();
        let index = store.frame(kind).index();
        self.positions(kind)
            .iter()
            .filter_map(|&p| index.label(p).map(str::to_string))
            .collect()
    }

    pub(crate) fn axis(&self, kind: AxisKind) -> Result<Axis, TreeDataError> {
        self.parent
            .read()
            .frame(kind)
            .index()
            .take(self.positions(kind))
    }

    pub(crate) fn frame(&self, kind: AxisKind) -> Result<Frame, TreeDataError> {
        self.parent.read().frame(kind).take(self.positions(kind))
    }

    pub(crate) fn column(&self, kind: AxisKind, name: &str) -> Option<Column> {
        let store = self.parent.read();
        store
            .frame(kind)
            .column(name)
            .map(|c| c.take(self.positions(kind)))
    }

    pub(crate) fn x(&self) -> Result<Matrix, TreeDataError> {
        self.parent.read().x.take(&self.obs, &self.var)
    }

    pub(crate) fn x_value(&self, row: usize, col: usize) -> Option<f64> {
        let (r, c) = (*self.obs.get(row)?, *self.var.get(col)?);
        self.parent.read().x.get(r, c)
    }

    /// Parent graph `key` plus this view's subset of it.
    pub(crate) fn graph(
        &self,
        kind: AxisKind,
        key: &str,
        policy: EmptySubsetPolicy,
    ) -> Result<(SharedGraph, Arc<NodeSubset>), TreeDataError> {
        let (graph, index) = {
            let store = self.parent.read();
            let graph = store
                .graphs(kind)
                .get(key)
                .cloned()
                .ok_or_else(|| TreeDataError::UnknownKey {
                    kind: graph_kind(kind),
                    name: key.to_string(),
                })?;
            (graph, store.frame(kind).shared_index())
        };

        let g = graph.read();
        let cache_key = (kind, key.to_string());
        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(&cache_key) {
            if hit.version == g.version()
                && hit.policy == policy
                && Weak::ptr_eq(&hit.graph, &Arc::downgrade(&graph))
            {
                return Ok((Arc::clone(&graph), Arc::clone(&hit.subset)));
            }
        }
        let targets = self.positions(kind).iter().filter_map(|&p| index.label(p));
        let subset = Arc::new(ancestor_closure(&g, targets, policy)?);
        log::trace!("view cached {kind} subset `{key}` at version {}", g.version());
        cache.insert(
            cache_key,
            CachedSubset {
                graph: Arc::downgrade(&graph),
                version: g.version(),
                policy,
                subset: Arc::clone(&subset),
            },
        );
        drop(g);
        Ok((graph, subset))
    }

    /// Names of the parent's graphs on `kind`.
    pub(crate) fn graph_keys(&self, kind: AxisKind) -> Vec<String> {
        self.parent.read().graphs(kind).keys().cloned().collect()
    }

    /// Build an independent store holding exactly what this view shows.
    ///
    /// Everything is snapshotted from one read of the parent; on error nothing
    /// has been handed out.
    pub(crate) fn materialize(&self, policy: EmptySubsetPolicy) -> Result<Store, TreeDataError> {
        let store = self.parent.read();
        let x = store.x.take(&self.obs, &self.var)?;
        let obs = store.obs.take(&self.obs)?;
        let var = store.var.take(&self.var)?;
        let obst = subset_graphs(&store.obst, &obs, policy)?;
        let vart = subset_graphs(&store.vart, &var, policy)?;
        let out = Store {
            x,
            obs,
            var,
            obst,
            vart,
        };
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        out.debug_assert_invariants();
        Ok(out)
    }
}

fn subset_graphs(
    graphs: &AxisGraphs,
    frame: &Frame,
    policy: EmptySubsetPolicy,
) -> Result<AxisGraphs, TreeDataError> {
    graphs
        .iter()
        .map(|(key, g)| {
            let g = g.read();
            let targets = frame.index().labels().iter().map(String::as_str);
            let subset = ancestor_closure(&g, targets, policy)?;
            Ok((key.clone(), Arc::new(RwLock::new(subset_tree(&g, &subset)))))
        })
        .collect()
}

pub(crate) fn graph_kind(kind: AxisKind) -> &'static str {
    match kind {
        AxisKind::Obs => "obst graph",
        AxisKind::Var => "vart graph",
    }
}

impl DebugInvariants for ViewState {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ViewState invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        let store = self.parent.read();
        store.validate_invariants()?;
        for kind in [AxisKind::Obs, AxisKind::Var] {
            // take() rejects out-of-range and repeated positions
            store.frame(kind).index().take(self.positions(kind))?;
        }
        Ok(())
    }
}
