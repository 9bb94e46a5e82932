//! Pre/post pairing of feature rows and the case/control split

use crate::cohort::features::FeatureRow;
use crate::cohort::records::PatientId;
use crate::io::configuration::{CASE_ARM, CONTROL_ARM, POST_PHASE, PRE_PHASE};
use crate::io::error::{PipelineError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Cell counts of one treatment phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseCounts {
    /// Number of cells
    pub total_cells: usize,
    /// Cells labeled malignant
    pub malignant_cells: usize,
    /// Cells labeled normal
    pub normal_cells: usize,
    /// `malignant_cells / total_cells`
    pub malignant_ratio: f64,
}

impl From<&FeatureRow> for PhaseCounts {
    fn from(row: &FeatureRow) -> Self {
        Self {
            total_cells: row.total_cells,
            malignant_cells: row.malignant_cells,
            normal_cells: row.normal_cells,
            malignant_ratio: row.malignant_ratio,
        }
    }
}

/// Pre and post measurements of one patient in one arm
#[derive(Clone, Debug, PartialEq)]
pub struct PrePostRow {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Cohort assignment
    pub arm: String,
    /// Counts before treatment
    pub pre: PhaseCounts,
    /// Counts after treatment
    pub post: PhaseCounts,
    /// `pre.malignant_ratio - post.malignant_ratio`, positive when the ratio fell
    pub change_in_malignant_ratio: f64,
}

/// Cohort assignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arm {
    /// Treated cohort
    Case,
    /// Untreated cohort
    Control,
}

impl FromStr for Arm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CASE_ARM => Ok(Self::Case),
            CONTROL_ARM => Ok(Self::Control),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Case => f.write_str(CASE_ARM),
            Self::Control => f.write_str(CONTROL_ARM),
        }
    }
}

/// Changes in malignant ratio per arm, in patient order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CohortSamples {
    /// Changes of the case arm
    pub case: Vec<f64>,
    /// Changes of the control arm
    pub control: Vec<f64>,
}

/// Join pre and post rows on (patient, arm)
///
/// Combinations missing either phase are left out and counted in a warning, as
/// are rows with any other treatment value. When a phase appears more than once
/// for the same (patient, arm), the first row is kept and the rest are counted
/// in a warning. Output is sorted by patient id, then arm.
pub fn pair(features: &[FeatureRow]) -> Vec<PrePostRow> {
    type Phases<'a> = (Option<&'a FeatureRow>, Option<&'a FeatureRow>);

    let mut by_patient: BTreeMap<(&PatientId, &str), Phases<'_>> = BTreeMap::new();
    let mut other_phase = 0usize;
    let mut duplicates = 0usize;

    for row in features {
        let slot = (&row.key.patient_id, row.key.arm.as_str());
        let phase = match row.key.treatment.as_str() {
            PRE_PHASE => &mut by_patient.entry(slot).or_default().0,
            POST_PHASE => &mut by_patient.entry(slot).or_default().1,
            _ => {
                other_phase += 1;
                continue;
            }
        };
        if phase.is_some() {
            duplicates += 1;
        } else {
            *phase = Some(row);
        }
    }

    let mut unmatched = Vec::new();
    let mut pairs = Vec::with_capacity(by_patient.len());
    for ((patient_id, arm), phases) in by_patient {
        let (Some(pre), Some(post)) = phases else {
            unmatched.push(format!("{patient_id}/{arm}"));
            continue;
        };
        pairs.push(PrePostRow {
            patient_id: patient_id.clone(),
            arm: arm.to_string(),
            pre: PhaseCounts::from(pre),
            post: PhaseCounts::from(post),
            change_in_malignant_ratio: pre.malignant_ratio - post.malignant_ratio,
        });
    }

    if !unmatched.is_empty() {
        warn!(
            dropped = unmatched.len(),
            patients = %unmatched.join(", "),
            "patients without both pre and post measurements were excluded"
        );
    }
    if other_phase > 0 {
        warn!(
            rows = other_phase,
            "feature rows with a treatment other than pre/post were ignored"
        );
    }
    if duplicates > 0 {
        warn!(
            rows = duplicates,
            "repeated feature rows for the same patient, arm and phase were ignored"
        );
    }
    info!(pairs = pairs.len(), "paired pre/post measurements");
    pairs
}

/// Partition the changes into case and control samples
///
/// # Errors
///
/// Returns [`PipelineError::UnknownArm`] for any arm other than case or control
pub fn split(pairs: &[PrePostRow]) -> Result<CohortSamples> {
    let mut samples = CohortSamples::default();
    for row in pairs {
        let arm = row
            .arm
            .parse::<Arm>()
            .map_err(|arm| PipelineError::UnknownArm {
                patient_id: row.patient_id.to_string(),
                arm,
            })?;
        match arm {
            Arm::Case => samples.case.push(row.change_in_malignant_ratio),
            Arm::Control => samples.control.push(row.change_in_malignant_ratio),
        }
    }
    Ok(samples)
}
