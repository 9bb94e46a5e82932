//! Histopathology cohort pipeline: tissue patch sampling, identifier reconciliation,
//! malignant-cell feature aggregation and pre/post treatment comparison
//!
//! Patches are drawn from multi-resolution slides, external models turn them into
//! labeled cells, and the cell tables are joined with clinical metadata to test
//! whether the malignant-cell ratio changes differently in case and control arms.

#![forbid(unsafe_code)]

/// Cell and metadata rows, grouped features and pre/post pairing
pub mod cohort;
/// Input/output operations and error handling
pub mod io;
/// Identifier similarity and dataset reconciliation
pub mod matching;
/// Tail probabilities and two-sample tests
pub mod math;
/// External model interfaces and stage orchestration
pub mod pipeline;
/// Slide access and tissue patch sampling
pub mod sampling;

pub use io::error::{PipelineError, Result};
