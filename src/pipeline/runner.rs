//! The two passes of a pipeline run
//!
//! [`SlideRun`] turns one slide into classified cell rows. [`CohortAnalysis`]
//! turns all cell rows plus the metadata table into the cohort comparison.

use crate::cohort::features::{FeatureRow, aggregate};
use crate::cohort::pairing::{CohortSamples, PrePostRow, pair, split};
use crate::cohort::records::{CellRow, MetadataRecord, cell_names, join, metadata_names};
use crate::io::error::{PipelineError, Result};
use crate::matching::reconcile::{CanonicalMapping, Reconciler};
use crate::math::statistics::{TestOutcome, mann_whitney_u, mean, welch_t_test};
use crate::pipeline::collaborators::{
    Classifier, Reporter, SegmentationMask, Segmenter, ensure_same_length,
};
use crate::sampling::sampler::{PatchSampler, SamplingProgress};
use crate::sampling::slide::SlideImage;
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{info, warn};

type Comparison = fn(&[f64], &[f64]) -> Result<TestOutcome>;

/// Per-slide pass: sample, segment, classify
pub struct SlideRun<'a, S: ?Sized, C: ?Sized> {
    segmenter: &'a mut S,
    classifier: &'a mut C,
}

impl<'a, S, C> SlideRun<'a, S, C>
where
    S: Segmenter + ?Sized,
    C: Classifier + ?Sized,
{
    /// Bind the collaborators used for every slide
    pub fn new(segmenter: &'a mut S, classifier: &'a mut C) -> Self {
        Self {
            segmenter,
            classifier,
        }
    }

    /// Produce the cell rows of one slide, named `sample_name`
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails, a collaborator fails, or a
    /// collaborator returns a different number of results than it was given
    pub fn process<I, R>(
        &mut self,
        slide: &I,
        sample_name: &str,
        sampler: &mut PatchSampler<R>,
    ) -> Result<Vec<CellRow>>
    where
        I: SlideImage + ?Sized,
        R: Rng,
    {
        self.process_observed(slide, sample_name, sampler, |_| ControlFlow::Continue(()))
    }

    /// Same as [`Self::process`] with a sampling observer
    ///
    /// # Errors
    ///
    /// See [`Self::process`]
    pub fn process_observed<I, R, F>(
        &mut self,
        slide: &I,
        sample_name: &str,
        sampler: &mut PatchSampler<R>,
        observer: F,
    ) -> Result<Vec<CellRow>>
    where
        I: SlideImage + ?Sized,
        R: Rng,
        F: FnMut(SamplingProgress) -> ControlFlow<()>,
    {
        let patches = sampler.sample_observed(slide, observer)?;

        let masks = self.segmenter.segment(&patches)?;
        ensure_same_length("segmentation", patches.len(), masks.len())?;
        let instances: usize = masks.iter().map(SegmentationMask::instance_count).sum();

        let classifications = self.classifier.classify(&masks)?;
        ensure_same_length("classification", masks.len(), classifications.len())?;

        let rows: Vec<CellRow> = classifications
            .into_iter()
            .flat_map(|classification| classification.cells)
            .map(|label| CellRow {
                name: sample_name.to_string(),
                label,
            })
            .collect();

        info!(
            sample = sample_name,
            patches = patches.len(),
            instances,
            cells = rows.len(),
            "classified slide"
        );
        Ok(rows)
    }
}

/// Every table derived by a cohort analysis
#[derive(Clone, Debug, PartialEq)]
pub struct CohortReport {
    /// Identifier correspondence used for the join
    pub mapping: CanonicalMapping,
    /// One row per (patient, arm, treatment)
    pub features: Vec<FeatureRow>,
    /// One row per (patient, arm) with both phases
    pub pairs: Vec<PrePostRow>,
    /// Changes in malignant ratio per arm
    pub samples: CohortSamples,
    /// Test outcomes, absent when a sample was too small to test
    pub tests: Vec<TestOutcome>,
}

impl CohortReport {
    /// Flatten sample summaries and test outcomes into named metrics
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        let arms = [("case", &self.samples.case), ("control", &self.samples.control)];
        for (name, values) in arms {
            metrics.insert(format!("{name}.n"), values.len() as f64);
            if let Some(m) = mean(values) {
                metrics.insert(format!("{name}.mean"), m);
            }
        }
        for outcome in &self.tests {
            outcome.write_metrics(&mut metrics);
        }
        metrics
    }

    /// Hand the metrics to a report generator
    ///
    /// # Errors
    ///
    /// Returns an error if the reporter fails
    pub fn render<P: Reporter + ?Sized>(&self, reporter: &mut P) -> Result<String> {
        reporter.report(&self.metrics())
    }
}

/// Per-cohort pass: reconcile, join, aggregate, pair, split, test
#[derive(Clone, Copy, Debug, Default)]
pub struct CohortAnalysis {
    reconciler: Reconciler,
}

impl CohortAnalysis {
    /// Create an analysis with the given identifier matcher
    pub const fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// Run every cohort stage
    ///
    /// Samples too small for a test leave that test out of the report instead
    /// of failing the run.
    ///
    /// # Errors
    ///
    /// Returns an error if reconciliation, the join, aggregation or the arm
    /// split fails, or a test fails for a reason other than sample size
    pub fn run(&self, cells: &[CellRow], metadata: &[MetadataRecord]) -> Result<CohortReport> {
        let mapping = self
            .reconciler
            .reconcile(&cell_names(cells), &metadata_names(metadata))?;
        let joined = join(cells, metadata, &mapping)?;
        let features = aggregate(&joined)?;
        let pairs = pair(&features);
        let samples = split(&pairs)?;

        let comparisons: [Comparison; 2] = [welch_t_test, mann_whitney_u];
        let mut tests = Vec::new();
        for compare in comparisons {
            match compare(&samples.case, &samples.control) {
                Ok(outcome) => tests.push(outcome),
                Err(PipelineError::InsufficientSamples {
                    test: name, actual, ..
                }) => {
                    warn!(test = name, actual, "sample too small, test skipped");
                }
                Err(other) => return Err(other),
            }
        }

        Ok(CohortReport {
            mapping,
            features,
            pairs,
            samples,
            tests,
        })
    }
}
