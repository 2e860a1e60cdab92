//! Frame: labeled per-axis table of typed columns.
//!
//! A `Frame` is keyed by an [`Axis`]; every column holds exactly one entry per
//! axis label. Columns keep their insertion order.

use std::sync::Arc;

use crate::axis::Axis;
use crate::debug_invariants::DebugInvariants;
use crate::topology::value::Value;
use crate::tree_error::TreeDataError;

/// One typed column of a [`Frame`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Column {
    /// Floating point values.
    Float(Vec<f64>),
    /// Integer values.
    Int(Vec<i64>),
    /// Boolean values.
    Bool(Vec<bool>),
    /// String values.
    Str(Vec<String>),
}

impl Column {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    /// Whether the column has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `row` as a [`Value`].
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            Column::Float(v) => v.get(row).copied().map(Value::Float),
            Column::Int(v) => v.get(row).copied().map(Value::Int),
            Column::Bool(v) => v.get(row).copied().map(Value::Bool),
            Column::Str(v) => v.get(row).cloned().map(Value::Str),
        }
    }

    /// New column holding the entries at `rows`, in that order.
    ///
    /// Callers pass positions already validated against the owning axis.
    pub(crate) fn take(&self, rows: &[usize]) -> Column {
        fn pick<T: Clone>(v: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|&r| v[r].clone()).collect()
        }
        match self {
            Column::Float(v) => Column::Float(pick(v, rows)),
            Column::Int(v) => Column::Int(pick(v, rows)),
            Column::Bool(v) => Column::Bool(pick(v, rows)),
            Column::Str(v) => Column::Str(pick(v, rows)),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Column::Bool(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Str(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Str(v.into_iter().map(str::to_string).collect())
    }
}

impl From<std::ops::Range<i64>> for Column {
    fn from(r: std::ops::Range<i64>) -> Self {
        Column::Int(r.collect())
    }
}

/// Table keyed by an axis.
///
/// # Invariants
/// Every column has `index.len()` entries; column names are unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    index: Arc<Axis>,
    columns: Vec<(String, Column)>,
}

impl Frame {
    /// Empty table over `index`.
    pub fn new(index: Axis) -> Self {
        Self {
            index: Arc::new(index),
            columns: Vec::new(),
        }
    }

    /// Empty table over the given labels.
    ///
    /// # Errors
    /// `DuplicateLabel` if labels repeat.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, TreeDataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Axis::try_new(labels)?))
    }

    /// Builder form of [`Frame::insert_column`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Self, TreeDataError> {
        self.insert_column(name, column)?;
        Ok(self)
    }

    /// Row labels.
    #[inline]
    pub fn index(&self) -> &Axis {
        &self.index
    }

    pub(crate) fn shared_index(&self) -> Arc<Axis> {
        Arc::clone(&self.index)
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Add or replace a column. A replaced column keeps its position.
    ///
    /// # Errors
    /// `ColumnLengthMismatch` if the column length differs from `n_rows()`.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Option<Column>, TreeDataError> {
        let name = name.into();
        let column = column.into();
        self.check_column(&name, &column)?;
        let old = match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, column)),
            None => {
                self.columns.push((name, column));
                None
            }
        };
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(old)
    }

    /// Remove a column by name.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(pos).1)
    }

    /// Validate a column against this table without inserting it.
    ///
    /// # Errors
    /// `ColumnLengthMismatch` if the column length differs from `n_rows()`.
    pub fn check_column(&self, name: &str, column: &Column) -> Result<(), TreeDataError> {
        if column.len() != self.n_rows() {
            return Err(TreeDataError::ColumnLengthMismatch {
                name: name.to_string(),
                expected: self.n_rows(),
                found: column.len(),
            });
        }
        Ok(())
    }

    /// Independent copy holding the rows at `positions`, in that order.
    ///
    /// # Errors
    /// `MissingNode` or `DuplicateLabel` from the index (out of range or
    /// repeated positions).
    pub fn take(&self, positions: &[usize]) -> Result<Self, TreeDataError> {
        let index = self.index.take(positions)?;
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| (name.clone(), col.take(positions)))
            .collect();
        Ok(Self {
            index: Arc::new(index),
            columns,
        })
    }

    /// Independent copy holding the rows labelled `labels`, in that order.
    ///
    /// # Errors
    /// `MissingNode` for the first label not in the index.
    pub fn take_labels<'a, I>(&self, labels: I) -> Result<Self, TreeDataError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let positions = labels
            .into_iter()
            .map(|l| {
                self.index
                    .position(l)
                    .ok_or_else(|| TreeDataError::MissingNode(l.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.take(&positions)
    }
}

impl DebugInvariants for Frame {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Frame invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        self.index.validate_invariants()?;
        for (name, col) in &self.columns {
            self.check_column(name, col)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::from_labels(["7", "8", "9"])
            .unwrap()
            .with_column("anno", 0..3i64)
            .unwrap()
            .with_column("kind", vec!["a", "b", "c"])
            .unwrap()
    }

    #[test]
    fn take_copies_rows_in_order() {
        let f = frame();
        let sub = f.take(&[2, 0]).unwrap();
        assert_eq!(sub.index().labels(), &["9", "7"]);
        assert_eq!(sub.column("anno"), Some(&Column::Int(vec![2, 0])));
        assert_eq!(sub.column("kind").unwrap().get(1), Some(Value::Str("a".into())));
        // source untouched
        assert_eq!(f.column("anno"), Some(&Column::Int(vec![0, 1, 2])));
    }

    #[test]
    fn insert_checks_length_and_replaces_in_place() {
        let mut f = frame();
        let err = f.insert_column("bad", vec![1.0]).unwrap_err();
        assert!(matches!(err, TreeDataError::ColumnLengthMismatch { expected: 3, found: 1, .. }));
        let old = f.insert_column("anno", vec![true, false, true]).unwrap();
        assert_eq!(old, Some(Column::Int(vec![0, 1, 2])));
        assert_eq!(f.column_names().collect::<Vec<_>>(), vec!["anno", "kind"]);
    }

    #[test]
    fn take_labels_reorders() {
        let f = frame();
        let sub = f.take_labels(["8", "7"]).unwrap();
        assert_eq!(sub.column("anno"), Some(&Column::Int(vec![1, 0])));
        assert!(f.take_labels(["x"]).is_err());
    }
}
