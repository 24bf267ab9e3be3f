//! Composite keys for factorial reader-study designs.
//!
//! A study crosses dose levels, lesion contrasts, noise realizations and
//! reconstruction methods. Patches for each cell are stored in a
//! [`StudyMap`] keyed by [`CellKey`]; the ordered map keeps every cell of a
//! (dose, contrast, realization) together so conditions can be assembled
//! with [`condition`] and [`trials`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::ConditionData;
use crate::types::{Class, PatchMatrix};

/// Reconstruction method of a condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Recon {
    /// Filtered back-projection.
    Fbp,
    /// Metal artifact reduction.
    Mar,
    /// Any other method, by name.
    Other(String),
}

impl fmt::Display for Recon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recon::Fbp => write!(f, "FBP"),
            Recon::Mar => write!(f, "MAR"),
            Recon::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One cell of the study design.
///
/// `dose`, `contrast` and `realization` index into the study's level lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    /// Dose level index.
    pub dose: usize,
    /// Lesion contrast index.
    pub contrast: usize,
    /// Noise realization index.
    pub realization: usize,
    /// Reconstruction method.
    pub recon: Recon,
    /// Signal-absent or signal-present.
    pub class: Class,
}

impl CellKey {
    /// Key for a cell.
    pub fn new(
        dose: usize,
        contrast: usize,
        realization: usize,
        recon: Recon,
        class: Class,
    ) -> Self {
        Self {
            dose,
            contrast,
            realization,
            recon,
            class,
        }
    }

    /// The same cell with the other class.
    pub fn with_class(&self, class: Class) -> Self {
        Self {
            class,
            ..self.clone()
        }
    }
}

/// Patch collections (or any per-cell value) indexed by cell.
pub type StudyMap<V> = BTreeMap<CellKey, V>;

/// Every cell of the design, both classes per cell, in key order.
pub fn grid<'a>(
    doses: usize,
    contrasts: usize,
    realizations: usize,
    recons: &'a [Recon],
) -> impl Iterator<Item = CellKey> + 'a {
    (0..doses).flat_map(move |dose| {
        (0..contrasts).flat_map(move |contrast| {
            (0..realizations).flat_map(move |realization| {
                recons.iter().flat_map(move |recon| {
                    [Class::Absent, Class::Present].into_iter().map(move |class| {
                        CellKey::new(dose, contrast, realization, recon.clone(), class)
                    })
                })
            })
        })
    })
}

/// Signal-absent and signal-present patches of one cell.
///
/// `key.class` is ignored.
///
/// # Errors
///
/// [`Error::DegenerateInput`] if either class is missing from `map`.
pub fn split_by_class<'m>(
    map: &'m StudyMap<PatchMatrix>,
    key: &CellKey,
) -> Result<(&'m PatchMatrix, &'m PatchMatrix)> {
    let absent = map
        .get(&key.with_class(Class::Absent))
        .ok_or(Error::DegenerateInput("cell has no signal-absent patches"))?;
    let present = map
        .get(&key.with_class(Class::Present))
        .ok_or(Error::DegenerateInput("cell has no signal-present patches"))?;
    Ok((absent, present))
}

/// Assemble the condition for one cell, named after its reconstruction.
pub fn condition(map: &StudyMap<PatchMatrix>, key: &CellKey) -> Result<ConditionData> {
    let (absent, present) = split_by_class(map, key)?;
    Ok(ConditionData::new(
        key.recon.to_string(),
        absent.clone(),
        present.clone(),
    ))
}

/// Assemble one condition per realization for a (dose, contrast, recon) cell.
///
/// Realizations are returned in index order, so two recons of the same cell
/// pair up trial by trial.
pub fn trials(
    map: &StudyMap<PatchMatrix>,
    dose: usize,
    contrast: usize,
    recon: &Recon,
) -> Result<Vec<ConditionData>> {
    let mut realizations: Vec<usize> = map
        .keys()
        .filter(|k| k.dose == dose && k.contrast == contrast && &k.recon == recon)
        .map(|k| k.realization)
        .collect();
    realizations.dedup();

    realizations
        .into_iter()
        .map(|realization| {
            let key = CellKey::new(dose, contrast, realization, recon.clone(), Class::Absent);
            condition(map, &key)
        })
        .collect()
}
