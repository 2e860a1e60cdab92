#![cfg_attr(docsrs, feature(doc_cfg))]
//! # tree-data
//!
//! tree-data is an in-memory annotated data container: a primary numeric
//! matrix, labeled tables for its rows (observations) and columns
//! (variables), and tree annotations keyed to either axis (e.g. lineage
//! trees whose leaves are observations).
//!
//! ## Features
//! - Ordered, unique-label axes and a single selector type (positions, labels,
//!   boolean masks, slices, scalars) resolved once into positions
//! - Lazy views: slicing shares the owner's storage and computes reads on demand
//! - Copy-on-write: the first mutation of a view materializes an independent
//!   copy atomically and logs a warning
//! - Ancestor-preserving tree subsetting with deterministic edge order
//! - Capability-restricted tree handles on views: attribute edits are shared
//!   with the owner, structural edits are rejected
//!
//! ## Views and trees
//!
//! A tree read from a view is the subgraph induced on the view's labels plus
//! every ancestor of them. Before materialization that handle aliases the
//! owner's graph, so `set_node_attr` through the view is visible on the owner.
//! After materialization every tree is a private deep copy.
//!
//! ## Invariant checking
//!
//! Debug builds (or the `check-invariants` feature) validate data structures
//! after mutations through [`DebugInvariants`].

pub mod algs;
pub mod axis;
pub mod container;
pub mod data;
pub mod debug_invariants;
pub mod topology;
pub mod tree_error;

pub use container::TreeData;
pub use debug_invariants::DebugInvariants;
pub use tree_error::{SelectorError, TreeDataError};

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::subset::{EmptySubsetPolicy, NodeSubset, ancestor_closure, subset_tree};
    pub use crate::axis::{Axis, AxisKind, Selector};
    pub use crate::container::{GraphHandle, ImplicitCopyHandling, TreeData, TreeDataOptions};
    pub use crate::data::frame::{Column, Frame};
    pub use crate::data::matrix::Matrix;
    pub use crate::data::storage::{Storage, VecStorage};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::topology::tree::TreeGraph;
    pub use crate::topology::value::{AttrMap, Value};
    pub use crate::tree_error::{SelectorError, TreeDataError};
}
