//! CSV export of the derived cohort tables

use crate::cohort::features::FeatureRow;
use crate::cohort::pairing::PrePostRow;
use crate::io::error::{Result, WithPath};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct FeatureCsvRow<'a> {
    patient_id: &'a str,
    arm: &'a str,
    treatment: &'a str,
    total_cells: usize,
    malignant_cells: usize,
    normal_cells: usize,
    malignant_ratio: f64,
}

#[derive(Serialize)]
struct PrePostCsvRow<'a> {
    patient_id: &'a str,
    arm: &'a str,
    total_cells_pre: usize,
    malignant_cells_pre: usize,
    normal_cells_pre: usize,
    malignant_ratio_pre: f64,
    total_cells_post: usize,
    malignant_cells_post: usize,
    normal_cells_post: usize,
    malignant_ratio_post: f64,
    change_in_malignant_ratio: f64,
}

#[derive(Serialize)]
struct MetricCsvRow<'a> {
    metric: &'a str,
    value: f64,
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_path(path)?;
    for row in rows {
        writer.serialize(row).with_path(path)?;
    }
    writer.flush().with_path(path)?;
    Ok(())
}

/// Write one line per feature group
///
/// # Errors
///
/// Returns an error if the file can't be written
pub fn write_features(path: &Path, features: &[FeatureRow]) -> Result<()> {
    write_rows(
        path,
        features.iter().map(|row| FeatureCsvRow {
            patient_id: row.key.patient_id.as_str(),
            arm: &row.key.arm,
            treatment: &row.key.treatment,
            total_cells: row.total_cells,
            malignant_cells: row.malignant_cells,
            normal_cells: row.normal_cells,
            malignant_ratio: row.malignant_ratio,
        }),
    )
}

/// Write one line per paired patient with `_pre`/`_post` suffixed columns
///
/// # Errors
///
/// Returns an error if the file can't be written
pub fn write_pre_post(path: &Path, pairs: &[PrePostRow]) -> Result<()> {
    write_rows(
        path,
        pairs.iter().map(|row| PrePostCsvRow {
            patient_id: row.patient_id.as_str(),
            arm: &row.arm,
            total_cells_pre: row.pre.total_cells,
            malignant_cells_pre: row.pre.malignant_cells,
            normal_cells_pre: row.pre.normal_cells,
            malignant_ratio_pre: row.pre.malignant_ratio,
            total_cells_post: row.post.total_cells,
            malignant_cells_post: row.post.malignant_cells,
            normal_cells_post: row.post.normal_cells,
            malignant_ratio_post: row.post.malignant_ratio,
            change_in_malignant_ratio: row.change_in_malignant_ratio,
        }),
    )
}

/// Write `metric,value` lines in metric order
///
/// # Errors
///
/// Returns an error if the file can't be written
pub fn write_metrics(path: &Path, metrics: &BTreeMap<String, f64>) -> Result<()> {
    write_rows(
        path,
        metrics
            .iter()
            .map(|(metric, &value)| MetricCsvRow { metric, value }),
    )
}
