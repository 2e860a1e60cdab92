//! Selector resolution (the index resolver).
//!
//! Every way of naming a subset of an axis is a [`Selector`] variant. A
//! selector is resolved exactly once into an ordered list of positions in
//! `[0, len)`; everything downstream (matrix slicing, table slicing, tree
//! subsetting) only ever sees that list.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use hashbrown::HashSet;

use crate::axis::{Axis, AxisKind};
use crate::tree_error::SelectorError;

/// A subset request against one axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Every position, in axis order.
    Full,
    /// Python-style slice: bounds are clamped to the axis, `step >= 1`.
    Slice {
        start: usize,
        stop: Option<usize>,
        step: usize,
    },
    /// Ordered integer positions (may reorder).
    Positions(Vec<usize>),
    /// Ordered labels (may reorder).
    Labels(Vec<String>),
    /// Boolean mask, one entry per position.
    Mask(Vec<bool>),
    /// A single position; keeps the axis (length 1).
    Position(usize),
    /// A single label; keeps the axis (length 1).
    Label(String),
}

impl Selector {
    pub fn positions<I: IntoIterator<Item = usize>>(positions: I) -> Self {
        Selector::Positions(positions.into_iter().collect())
    }

    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::Labels(labels.into_iter().map(Into::into).collect())
    }

    pub fn mask<I: IntoIterator<Item = bool>>(mask: I) -> Self {
        Selector::Mask(mask.into_iter().collect())
    }

    /// Unit-step slice over `range`.
    pub fn range(range: Range<usize>) -> Self {
        Selector::Slice {
            start: range.start,
            stop: Some(range.end),
            step: 1,
        }
    }

    /// Slice over `range` taking every `step`-th position.
    pub fn stepped(range: Range<usize>, step: usize) -> Self {
        Selector::Slice {
            start: range.start,
            stop: Some(range.end),
            step,
        }
    }

    /// Whether this selector trivially keeps the whole axis.
    pub fn is_full(&self) -> bool {
        matches!(self, Selector::Full)
    }

    /// Resolve against `axis` into ordered positions.
    ///
    /// Label lists and position lists keep their requested order, so a
    /// selector can reorder an axis. Masks and slices yield ascending order.
    ///
    /// # Errors
    /// - `LabelNotFound` when a label is not on the axis,
    /// - `MaskLengthMismatch` when the mask length differs from `axis.len()`,
    /// - `PositionOutOfRange` for an integer position `>= axis.len()`,
    /// - `DuplicatePosition` when the same position is requested twice,
    /// - `ZeroStep` for a slice with `step == 0`.
    ///
    /// # Determinism
    /// Pure function of the selector and the axis labels.
    pub fn resolve(&self, axis: &Axis, kind: AxisKind) -> Result<Vec<usize>, SelectorError> {
        let len = axis.len();
        let check = |position: usize| {
            if position < len {
                Ok(position)
            } else {
                Err(SelectorError::PositionOutOfRange {
                    axis: kind,
                    position,
                    len,
                })
            }
        };
        let find = |label: &str| {
            axis.position(label)
                .ok_or_else(|| SelectorError::LabelNotFound {
                    axis: kind,
                    label: label.to_string(),
                })
        };

        let positions: Vec<usize> = match self {
            Selector::Full => (0..len).collect(),
            Selector::Slice { start, stop, step } => {
                if *step == 0 {
                    return Err(SelectorError::ZeroStep);
                }
                let stop = stop.map_or(len, |s| s.min(len));
                let start = (*start).min(stop);
                (start..stop).step_by(*step).collect()
            }
            Selector::Positions(list) => list.iter().map(|&p| check(p)).collect::<Result<_, _>>()?,
            Selector::Position(p) => vec![check(*p)?],
            Selector::Labels(list) => list.iter().map(|l| find(l.as_str())).collect::<Result<_, _>>()?,
            Selector::Label(l) => vec![find(l.as_str())?],
            Selector::Mask(mask) => {
                if mask.len() != len {
                    return Err(SelectorError::MaskLengthMismatch {
                        axis: kind,
                        expected: len,
                        found: mask.len(),
                    });
                }
                mask.iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect()
            }
        };

        if matches!(self, Selector::Positions(_) | Selector::Labels(_)) {
            let mut seen = HashSet::with_capacity(positions.len());
            for &p in &positions {
                if !seen.insert(p) {
                    return Err(SelectorError::DuplicatePosition {
                        axis: kind,
                        position: p,
                    });
                }
            }
        }

        log::trace!("resolved {kind} selector to {} of {len} positions", positions.len());
        Ok(positions)
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::Full
    }
}

impl From<Range<usize>> for Selector {
    fn from(range: Range<usize>) -> Self {
        Selector::range(range)
    }
}

impl From<RangeFrom<usize>> for Selector {
    fn from(range: RangeFrom<usize>) -> Self {
        Selector::Slice {
            start: range.start,
            stop: None,
            step: 1,
        }
    }
}

impl From<RangeTo<usize>> for Selector {
    fn from(range: RangeTo<usize>) -> Self {
        Selector::Slice {
            start: 0,
            stop: Some(range.end),
            step: 1,
        }
    }
}

impl From<usize> for Selector {
    fn from(position: usize) -> Self {
        Selector::Position(position)
    }
}

impl From<&str> for Selector {
    fn from(label: &str) -> Self {
        Selector::Label(label.to_string())
    }
}

impl From<String> for Selector {
    fn from(label: String) -> Self {
        Selector::Label(label)
    }
}

impl From<Vec<usize>> for Selector {
    fn from(positions: Vec<usize>) -> Self {
        Selector::Positions(positions)
    }
}

impl<const N: usize> From<[usize; N]> for Selector {
    fn from(positions: [usize; N]) -> Self {
        Selector::Positions(positions.to_vec())
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Selector::Mask(mask)
    }
}

impl<const N: usize> From<[bool; N]> for Selector {
    fn from(mask: [bool; N]) -> Self {
        Selector::Mask(mask.to_vec())
    }
}

impl From<Vec<String>> for Selector {
    fn from(labels: Vec<String>) -> Self {
        Selector::Labels(labels)
    }
}

impl From<Vec<&str>> for Selector {
    fn from(labels: Vec<&str>) -> Self {
        Selector::labels(labels)
    }
}

impl<const N: usize> From<[&str; N]> for Selector {
    fn from(labels: [&str; N]) -> Self {
        Selector::labels(labels)
    }
}
