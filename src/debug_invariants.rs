//! Structural self-checks for axes, tables, trees and container stores.
//!
//! Checks run after every constructor and promotion in debug builds, or in
//! release builds with the `check-invariants` feature.

use crate::tree_error::TreeDataError;

/// Validation of a value's internal consistency, such as unique axis labels
/// or a tree whose parent and child maps mirror each other.
pub trait DebugInvariants {
    /// Panic on a broken invariant when checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), TreeDataError>;
}

/// Run a fallible check and panic with `[invariants] <context>: <error>`
/// when checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
