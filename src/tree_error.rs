//! TreeDataError: Unified error type for tree-data public APIs
//!
//! Every fallible operation in the crate reports through [`TreeDataError`].
//! Selector resolution failures carry their own [`SelectorError`] so callers
//! can match on them without caring about the rest of the taxonomy.

use itertools::Itertools;
use thiserror::Error;

use crate::axis::AxisKind;

/// Failure to resolve a selector against an axis.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// A requested label is not present on the axis.
    #[error("label `{label}` not found on {axis} axis")]
    LabelNotFound { axis: AxisKind, label: String },
    /// Boolean mask length differs from the axis length.
    #[error("boolean mask of length {found} does not match {axis} axis of length {expected}")]
    MaskLengthMismatch {
        axis: AxisKind,
        expected: usize,
        found: usize,
    },
    /// Integer position outside `[0, len)`.
    #[error("position {position} out of range for {axis} axis of length {len}")]
    PositionOutOfRange {
        axis: AxisKind,
        position: usize,
        len: usize,
    },
    /// The same position was selected twice.
    #[error("position {position} selected more than once on {axis} axis")]
    DuplicatePosition { axis: AxisKind, position: usize },
    /// A slice with step zero.
    #[error("slice step must be non-zero")]
    ZeroStep,
}

/// Unified error type for tree-data operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeDataError {
    /// Selector could not be resolved.
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// A table or graph keyed to an axis does not cover all of its labels.
    #[error("{axis} annotation `{key}` is missing axis labels: [{}]", .missing.iter().join(", "))]
    Alignment {
        axis: AxisKind,
        key: String,
        missing: Vec<String>,
    },
    /// Structural edit attempted on a graph borrowed from a view.
    #[error("structural mutation rejected on view graph: {0}")]
    StructuralMutation(&'static str),
    /// Axis labels must be unique.
    #[error("duplicate label `{0}` on axis")]
    DuplicateLabel(String),
    /// Matrix dimensions disagree with the axes (or a buffer with its shape).
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A column's length differs from its table's row count.
    #[error("column `{name}` has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Node is not present in the graph.
    #[error("node `{0}` not in graph")]
    MissingNode(String),
    /// Edge is not present in the graph.
    #[error("edge `{0}` -> `{1}` not in graph")]
    MissingEdge(String, String),
    /// Edge already exists.
    #[error("edge `{0}` -> `{1}` already in graph")]
    DuplicateEdge(String, String),
    /// Adding the edge would give the target a second parent.
    #[error("node `{node}` already has parent `{parent}`")]
    MultipleParents { node: String, parent: String },
    /// The graph has no node with in-degree zero.
    #[error("graph has no root")]
    NoRoot,
    /// The graph is a forest where a single tree was required.
    #[error("graph has multiple roots: [{}]", .0.iter().join(", "))]
    MultipleRoots(Vec<String>),
    /// Adding the edge would close a cycle.
    #[error("edge `{0}` -> `{1}` would create a cycle")]
    CycleDetected(String, String),
    /// Named column or graph does not exist.
    #[error("no {kind} named `{name}`")]
    UnknownKey { kind: &'static str, name: String },
    /// Node exists in the parent graph but lies outside the view's subset.
    #[error("node `{0}` is outside the view's subtree")]
    NodeOutsideView(String),
}
