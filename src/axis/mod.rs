//! Observation/variable axes and selector resolution.
//!
//! An [`Axis`] is an ordered set of unique labels. A [`Selector`] names a
//! subset of an axis (positions, labels, mask, slice) and resolves to the
//! canonical ordered position list every downstream consumer works with.

pub mod labels;
pub mod selector;

pub use labels::Axis;
pub use selector::Selector;

use std::fmt;

/// Which axis of a container an annotation is keyed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisKind {
    /// Rows of the primary matrix.
    Obs,
    /// Columns of the primary matrix.
    Var,
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKind::Obs => f.write_str("obs"),
            AxisKind::Var => f.write_str("var"),
        }
    }
}
