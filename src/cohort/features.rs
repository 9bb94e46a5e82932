//! Per-group malignant-cell statistics

use crate::cohort::records::{CellLabel, GroupKey, LabeledCell};
use crate::io::error::{PipelineError, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Cell counts of one (patient, arm, treatment) group
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow {
    /// Group the counts belong to
    pub key: GroupKey,
    /// Number of cells in the group
    pub total_cells: usize,
    /// Cells labeled malignant
    pub malignant_cells: usize,
    /// Cells labeled normal
    pub normal_cells: usize,
    /// `malignant_cells / total_cells`
    pub malignant_ratio: f64,
}

impl FeatureRow {
    /// Count the labels of one group
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyGroup`] if there are no labels
    pub fn from_labels<'a, I>(key: GroupKey, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a CellLabel>,
    {
        let (mut total_cells, mut malignant_cells, mut normal_cells) = (0usize, 0usize, 0usize);
        for label in labels {
            total_cells += 1;
            match label {
                CellLabel::Malignant => malignant_cells += 1,
                CellLabel::Normal => normal_cells += 1,
                CellLabel::Other(_) => {}
            }
        }

        if total_cells == 0 {
            return Err(PipelineError::EmptyGroup {
                group: key.to_string(),
            });
        }

        Ok(Self {
            key,
            total_cells,
            malignant_cells,
            normal_cells,
            malignant_ratio: malignant_cells as f64 / total_cells as f64,
        })
    }
}

/// Reduce joined cells to one feature row per group, sorted by patient
///
/// Rows are ordered by patient id, then arm, then treatment.
///
/// # Errors
///
/// Returns an error if a group ends up without cells
pub fn aggregate(rows: &[LabeledCell]) -> Result<Vec<FeatureRow>> {
    let mut groups: BTreeMap<&GroupKey, Vec<&CellLabel>> = BTreeMap::new();
    for row in rows {
        groups.entry(&row.key).or_default().push(&row.label);
    }

    let features = groups
        .into_iter()
        .map(|(key, labels)| FeatureRow::from_labels(key.clone(), labels))
        .collect::<Result<Vec<_>>>()?;

    info!(
        groups = features.len(),
        cells = rows.len(),
        "aggregated cell labels"
    );
    Ok(features)
}
