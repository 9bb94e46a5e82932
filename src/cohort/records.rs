//! Cell and metadata rows and the exact-key join between them

use crate::io::configuration::{MALIGNANT_LABEL, NORMAL_LABEL};
use crate::io::error::{Result, invalid_source};
use crate::matching::reconcile::CanonicalMapping;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::warn;

/// Classification assigned to one cell
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellLabel {
    /// Counted as malignant
    Malignant,
    /// Counted as normal
    Normal,
    /// Any other label, counted only in the total
    Other(String),
}

impl From<&str> for CellLabel {
    fn from(value: &str) -> Self {
        match value.trim() {
            MALIGNANT_LABEL => Self::Malignant,
            NORMAL_LABEL => Self::Normal,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malignant => f.write_str(MALIGNANT_LABEL),
            Self::Normal => f.write_str(NORMAL_LABEL),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// One classified cell of a sample
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRow {
    /// Sample identifier as written by the classification stage
    pub name: String,
    /// Classification of the cell
    pub label: CellLabel,
}

impl CellRow {
    /// Create a row from a sample name and a raw label
    pub fn new(name: impl Into<String>, label: &str) -> Self {
        Self {
            name: name.into(),
            label: CellLabel::from(label),
        }
    }
}

/// Patient identifier ordered numerically when both sides are integers
///
/// Integer ids sort before any other id, so `"2" < "10" < "P1"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Wrap a raw identifier
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier as written in the metadata
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for PatientId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for PatientId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One metadata row describing a sample
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Sample identifier as written in the metadata table
    pub name: String,
    /// Patient the sample was taken from
    pub patient_id: PatientId,
    /// Cohort assignment, expected to be `case` or `control`
    pub arm: String,
    /// Treatment phase, expected to be `pre` or `post`
    pub treatment: String,
}

/// Aggregation key of a feature row
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Cohort assignment
    pub arm: String,
    /// Treatment phase
    pub treatment: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(patient {}, arm {}, treatment {})",
            self.patient_id, self.arm, self.treatment
        )
    }
}

/// A cell together with the metadata of its sample
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledCell {
    /// Group the cell belongs to
    pub key: GroupKey,
    /// Classification of the cell
    pub label: CellLabel,
}

/// Distinct sample identifiers of the cell rows
pub fn cell_names(cells: &[CellRow]) -> BTreeSet<String> {
    cells.iter().map(|cell| cell.name.clone()).collect()
}

/// Distinct sample identifiers of the metadata rows
pub fn metadata_names(metadata: &[MetadataRecord]) -> BTreeSet<String> {
    metadata.iter().map(|record| record.name.clone()).collect()
}

/// Join cells with metadata on exact identifier equality after remapping
///
/// Metadata identifiers are rewritten through the mapping first. Cells whose
/// identifier has no metadata row are left out.
///
/// # Errors
///
/// Returns an error if two metadata rows share an identifier after remapping
pub fn join(
    cells: &[CellRow],
    metadata: &[MetadataRecord],
    mapping: &CanonicalMapping,
) -> Result<Vec<LabeledCell>> {
    let mut by_name: HashMap<&str, &MetadataRecord> = HashMap::with_capacity(metadata.len());
    for record in metadata {
        let name = mapping.resolve(&record.name);
        if by_name.insert(name, record).is_some() {
            return Err(invalid_source(&format!(
                "metadata identifier '{name}' appears more than once"
            )));
        }
    }

    let mut unmatched = 0usize;
    let joined: Vec<LabeledCell> = cells
        .iter()
        .filter_map(|cell| {
            let Some(record) = by_name.get(cell.name.as_str()) else {
                unmatched += 1;
                return None;
            };
            Some(LabeledCell {
                key: GroupKey {
                    patient_id: record.patient_id.clone(),
                    arm: record.arm.clone(),
                    treatment: record.treatment.clone(),
                },
                label: cell.label.clone(),
            })
        })
        .collect();

    if unmatched > 0 {
        warn!(unmatched, "cells without a metadata row were excluded");
    }
    Ok(joined)
}
