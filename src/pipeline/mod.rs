//! Orchestration of the external models and the cohort stages

/// Interfaces of the segmentation, classification and report models
pub mod collaborators;
/// Per-slide and per-cohort passes
pub mod runner;

pub use collaborators::{Classification, Classifier, Reporter, SegmentationMask, Segmenter};
pub use runner::{CohortAnalysis, CohortReport, SlideRun};
