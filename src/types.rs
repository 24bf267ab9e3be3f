//! Type aliases and common types.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stack of vectorized patches, one sample per row (N×q).
pub type PatchMatrix = DMatrix<f64>;

/// Channel-space projections, one sample per row (N×k).
pub type ChannelMatrix = DMatrix<f64>;

/// Column vector used for templates, class means and decision values.
pub type Vector = DVector<f64>;

/// Ground-truth class of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Class {
    /// Signal absent (label 0).
    Absent,
    /// Signal present (label 1).
    Present,
}

impl Class {
    /// Numeric label as used in ROC analysis.
    pub fn label(self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Present => 1,
        }
    }
}

/// A binary label encoding.
///
/// Any non-zero (or `true`) value marks the signal-present class, so label
/// sets encoded as `{0, 1}`, `{-1, +1}` or `{false, true}` all work.
pub trait Label {
    /// Whether this label marks the signal-present class.
    fn is_present(&self) -> bool;
}

impl Label for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

impl Label for Class {
    fn is_present(&self) -> bool {
        matches!(self, Class::Present)
    }
}

impl Label for f64 {
    fn is_present(&self) -> bool {
        *self != 0.0
    }
}

impl Label for f32 {
    fn is_present(&self) -> bool {
        *self != 0.0
    }
}

macro_rules! impl_label_for_int {
    ($($t:ty),*) => {
        $(
            impl Label for $t {
                fn is_present(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

impl_label_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<L: Label + ?Sized> Label for &L {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// Coerce an arbitrary label encoding to presence flags.
pub fn binarize<L: Label>(labels: &[L]) -> Vec<bool> {
    labels.iter().map(Label::is_present).collect()
}

/// Stack equally sized patch vectors into an N×q matrix.
///
/// Fails with [`Error::DimensionMismatch`] if any row differs in length from
/// the first, and with [`Error::DegenerateInput`] if `rows` is empty.
pub fn patches_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<PatchMatrix> {
    let first = rows
        .first()
        .ok_or(Error::DegenerateInput("no patches supplied"))?;
    let q = first.as_ref().len();

    for row in rows {
        let len = row.as_ref().len();
        if len != q {
            return Err(Error::dimension("patch length", q, len));
        }
    }

    Ok(DMatrix::from_fn(rows.len(), q, |i, j| rows[i].as_ref()[j]))
}
