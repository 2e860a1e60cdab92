//! Axis: ordered unique labels with O(1) label lookup.
//!
//! A `labels` vector keeps the deterministic order and a `lookup` map answers
//! label queries in O(1).

use hashbrown::HashMap;

use crate::debug_invariants::DebugInvariants;
use crate::tree_error::TreeDataError;

/// `Axis` maintains:
/// - `labels`, the ordered label sequence,
/// - `lookup`, mapping each label back to its position.
///
/// # Invariants
///
/// - Labels are unique.
/// - `lookup` holds exactly the labels of `labels`, each at its position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Axis {
    labels: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Axis {
    /// Build an axis from labels, rejecting duplicates.
    ///
    /// # Errors
    /// Returns `Err(DuplicateLabel(label))` for the first repeated label.
    pub fn try_new<I, S>(labels: I) -> Result<Self, TreeDataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            if lookup.insert(label.clone(), pos).is_some() {
                return Err(TreeDataError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels, lookup })
    }

    /// Axis labelled `"0"`, `"1"`, … `"{n-1}"`.
    pub fn range(n: usize) -> Self {
        let labels: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        Self { labels, lookup }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in axis order.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label at `pos`, if in range.
    #[inline]
    pub fn label(&self, pos: usize) -> Option<&str> {
        self.labels.get(pos).map(String::as_str)
    }

    /// Position of `label`, if present.
    #[inline]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.lookup.contains_key(label)
    }

    /// New axis holding the labels at `positions`, in that order.
    ///
    /// # Errors
    /// Returns `Err(MissingNode)` naming the offending position when it is out
    /// of range, or `Err(DuplicateLabel)` when a position repeats.
    pub fn take(&self, positions: &[usize]) -> Result<Self, TreeDataError> {
        let labels = positions
            .iter()
            .map(|&p| {
                self.labels
                    .get(p)
                    .cloned()
                    .ok_or_else(|| TreeDataError::MissingNode(p.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_new(labels)
    }

    /// Labels of `self` that `has` does not report as present, in axis order.
    pub fn missing_from<F>(&self, mut has: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        self.labels
            .iter()
            .filter(|label| !has(label))
            .cloned()
            .collect()
    }
}

impl DebugInvariants for Axis {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Axis invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        if self.lookup.len() != self.labels.len() {
            let mut seen = hashbrown::HashSet::new();
            for label in &self.labels {
                if !seen.insert(label) {
                    return Err(TreeDataError::DuplicateLabel(label.clone()));
                }
            }
        }
        for (pos, label) in self.labels.iter().enumerate() {
            if self.lookup.get(label) != Some(&pos) {
                return Err(TreeDataError::DuplicateLabel(label.clone()));
            }
        }
        Ok(())
    }
}
