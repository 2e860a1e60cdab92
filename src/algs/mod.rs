//! Algorithms over tree annotations: ancestor-preserving subsetting and axis
//! alignment checks.

pub mod alignment;
pub mod subset;

pub use alignment::{check_frame_alignment, check_graph_alignment};
pub use subset::{EmptySubsetPolicy, NodeSubset, ancestor_closure, subset_tree};
