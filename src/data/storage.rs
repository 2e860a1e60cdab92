//! Pluggable storage for flat numeric buffers.
//!
//! This trait abstracts how the primary matrix's flat buffer is stored. The
//! container only ever needs CPU-slice semantics.

use core::fmt::{self, Debug};

use crate::tree_error::TreeDataError;

/// Contiguous, indexable storage for `V` with slice access.
pub trait Storage<V>: Debug {
    /// Construct a buffer of `len`, filled with `fill`.
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone;

    /// Wrap an existing vector.
    fn from_vec(data: Vec<V>) -> Self;

    /// Current length in elements.
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entire read-only buffer.
    fn as_slice(&self) -> &[V];

    /// Entire mutable buffer.
    fn as_mut_slice(&mut self) -> &mut [V];

    /// Gather the elements at `indices`, in that order, into a new buffer.
    fn gather<I>(&self, indices: I) -> Result<Self, TreeDataError>
    where
        Self: Sized,
        I: IntoIterator<Item = usize>,
        V: Clone,
    {
        let src = self.as_slice();
        let data = indices
            .into_iter()
            .map(|i| {
                src.get(i).cloned().ok_or(TreeDataError::ShapeMismatch {
                    expected: (src.len(), 1),
                    found: (i.saturating_add(1), 1),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_vec(data))
    }
}

/// `Vec`-backed storage (default).
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VecStorage<V>(pub(crate) Vec<V>);

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V> Storage<V> for VecStorage<V> {
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone,
    {
        Self(vec![fill; len])
    }

    fn from_vec(data: Vec<V>) -> Self {
        Self(data)
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_slice(&self) -> &[V] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_picks_in_order() {
        let s = VecStorage::from_vec(vec![10, 20, 30]);
        let g = s.gather([2, 0, 2]).unwrap();
        assert_eq!(g.as_slice(), &[30, 10, 30]);
        assert!(s.gather([3]).is_err());
        assert_eq!(VecStorage::with_len(2, 0.5).as_slice(), &[0.5, 0.5]);
    }
}
