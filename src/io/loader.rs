//! CSV loading of the metadata table and the per-sample cell tables

use crate::cohort::records::{CellRow, MetadataRecord, PatientId};
use crate::io::configuration::TABLE_EXTENSION;
use crate::io::error::{PipelineError, Result, WithPath};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct MetadataCsvRow {
    name: String,
    patient_id: String,
    arm: String,
    treatment: String,
}

#[derive(Debug, Deserialize)]
struct CellCsvRow {
    label: String,
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_path(path)
}

/// Load the metadata table (`name,patient_id,arm,treatment`, extra columns ignored)
///
/// # Errors
///
/// Returns an error if the file can't be read or a row lacks a column
pub fn load_metadata(path: &Path) -> Result<Vec<MetadataRecord>> {
    let mut table = reader(path)?;
    let mut records = Vec::new();
    for row in table.deserialize::<MetadataCsvRow>() {
        let row = row.with_path(path)?;
        records.push(MetadataRecord {
            name: row.name,
            patient_id: PatientId::new(row.patient_id),
            arm: row.arm,
            treatment: row.treatment,
        });
    }
    info!(rows = records.len(), path = %path.display(), "loaded metadata");
    Ok(records)
}

/// Load one cell table, naming every row after the file stem
///
/// # Errors
///
/// Returns an error if the file can't be read or a row lacks a label
pub fn load_cell_table(path: &Path) -> Result<Vec<CellRow>> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::InvalidSourceData {
            reason: format!("cell table '{}' has no file name", path.display()),
        })?;

    let mut table = reader(path)?;
    let mut rows = Vec::new();
    for row in table.deserialize::<CellCsvRow>() {
        let row = row.with_path(path)?;
        rows.push(CellRow::new(name.clone(), &row.label));
    }
    Ok(rows)
}

/// Files with the given extension directly inside `dir`, sorted by path
///
/// # Errors
///
/// Returns an error if the directory can't be listed
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_path(dir)? {
        let path = entry.with_path(dir)?.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every `*.csv` cell table of a directory, in path order
///
/// # Errors
///
/// Returns an error if the directory or any table can't be read
pub fn load_cell_tables(dir: &Path) -> Result<Vec<CellRow>> {
    let files = list_files(dir, &[TABLE_EXTENSION])?;
    let mut rows = Vec::new();
    for file in &files {
        rows.extend(load_cell_table(file)?);
    }
    info!(
        tables = files.len(),
        cells = rows.len(),
        path = %dir.display(),
        "loaded cell tables"
    );
    Ok(rows)
}
