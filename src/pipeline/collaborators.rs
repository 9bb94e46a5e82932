//! Interfaces of the external models the pipeline drives
//!
//! Segmentation, classification and report generation are opaque to the
//! pipeline. Implementations must return exactly one result per input, in input
//! order; the runner rejects anything else.

use crate::cohort::records::CellLabel;
use crate::io::error::{PipelineError, Result};
use crate::sampling::slide::Patch;
use ndarray::Array2;
use std::collections::BTreeMap;

/// Instance masks of one patch, one channel per segmentation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Label images, 0 is background and every other value one instance
    pub channels: Vec<Array2<u32>>,
}

impl SegmentationMask {
    /// Distinct instance labels of the first channel
    pub fn instance_count(&self) -> usize {
        let Some(first) = self.channels.first() else {
            return 0;
        };
        let mut labels: Vec<u32> = first.iter().copied().filter(|&v| v != 0).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

/// Labels of the cells found in one segmentation mask
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// One label per detected cell
    pub cells: Vec<CellLabel>,
}

/// Cell segmentation model
pub trait Segmenter {
    /// Segment every patch
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails
    fn segment(&mut self, patches: &[Patch]) -> Result<Vec<SegmentationMask>>;
}

/// Cell classification model
pub trait Classifier {
    /// Classify the cells of every mask
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails
    fn classify(&mut self, masks: &[SegmentationMask]) -> Result<Vec<Classification>>;
}

/// Report generation model
pub trait Reporter {
    /// Turn named metrics into a textual report
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails
    fn report(&mut self, metrics: &BTreeMap<String, f64>) -> Result<String>;
}

/// Fail unless a collaborator returned one result per input
///
/// # Errors
///
/// Returns [`PipelineError::CollaboratorContract`] on a length mismatch
pub fn ensure_same_length(stage: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::CollaboratorContract {
            stage,
            expected,
            actual,
        })
    }
}
