//! Axis alignment checks for per-axis annotations.
//!
//! Every table or graph keyed to an axis must cover all of that axis's labels.
//! Extra rows/nodes are allowed (a tree carries internal ancestors that are not
//! observations). The checks run when an annotation is assigned, so a
//! misaligned annotation never enters a container.

use crate::axis::{Axis, AxisKind};
use crate::data::frame::Frame;
use crate::topology::tree::TreeGraph;
use crate::tree_error::TreeDataError;

/// Ensure every label of `axis` is a node of `graph`.
///
/// # Errors
/// `Alignment` listing the missing labels in axis order.
pub fn check_graph_alignment(
    axis: &Axis,
    kind: AxisKind,
    key: &str,
    graph: &TreeGraph,
) -> Result<(), TreeDataError> {
    let missing = axis.missing_from(|label| graph.contains_node(label));
    report(kind, key, missing)
}

/// Ensure every label of `axis` is a row of `frame`.
///
/// # Errors
/// `Alignment` listing the missing labels in axis order.
pub fn check_frame_alignment(
    axis: &Axis,
    kind: AxisKind,
    key: &str,
    frame: &Frame,
) -> Result<(), TreeDataError> {
    let missing = axis.missing_from(|label| frame.index().contains(label));
    report(kind, key, missing)
}

fn report(kind: AxisKind, key: &str, missing: Vec<String>) -> Result<(), TreeDataError> {
    if missing.is_empty() {
        return Ok(());
    }
    log::debug!("{kind} annotation `{key}` misses {} axis labels", missing.len());
    Err(TreeDataError::Alignment {
        axis: kind,
        key: key.to_string(),
        missing,
    })
}
