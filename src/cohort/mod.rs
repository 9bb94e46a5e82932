//! Tabular cohort pipeline
//!
//! This module contains:
//! - Cell and metadata rows and their join
//! - Grouped reduction to malignant-cell features
//! - Pre/post pairing and the case/control split

/// Grouped reduction of labeled cells
pub mod features;
/// Pre/post pairing and arm split
pub mod pairing;
/// Row types and the cell/metadata join
pub mod records;

pub use features::{FeatureRow, aggregate};
pub use pairing::{Arm, CohortSamples, PrePostRow, pair, split};
pub use records::{CellLabel, CellRow, GroupKey, LabeledCell, MetadataRecord, PatientId};
