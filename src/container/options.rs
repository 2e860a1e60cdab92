//! Per-container configuration.

pub use crate::algs::subset::EmptySubsetPolicy;

/// Behavior when a view is implicitly copied by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImplicitCopyHandling {
    /// Log a warning through the `log` facade.
    #[default]
    Warn,
    /// Copy silently (debug-level record only).
    Ignore,
}

/// Options carried by a container and inherited by every view taken from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeDataOptions {
    /// Subset produced for a tree when a view keeps no labels of its axis.
    pub empty_subset: EmptySubsetPolicy,
    /// How copy-on-write promotion is reported.
    pub implicit_copy: ImplicitCopyHandling,
}

impl TreeDataOptions {
    pub fn with_empty_subset(mut self, policy: EmptySubsetPolicy) -> Self {
        self.empty_subset = policy;
        self
    }

    pub fn with_implicit_copy(mut self, handling: ImplicitCopyHandling) -> Self {
        self.implicit_copy = handling;
        self
    }
}
