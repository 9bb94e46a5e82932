//! Error types and path context for pipeline operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Why an identifier could not be resolved to a single counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ambiguity {
    /// No identifier in the other dataset passed the similarity threshold
    NoCandidates,
    /// More than one identifier qualified as the counterpart
    MultipleCandidates,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidates => write!(f, "no candidate"),
            Self::MultipleCandidates => write!(f, "multiple candidates"),
        }
    }
}

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// Failed to load a slide image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a patch image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Reading or writing a CSV table failed
    Csv {
        /// Path of the table
        path: PathBuf,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Input data doesn't meet pipeline requirements
    InvalidSourceData {
        /// Description of what's wrong with the input data
        reason: String,
    },

    /// Patch acquisition could not reach the requested count
    ///
    /// Occurs when either:
    /// - The attempt budget was spent
    /// - Every grid cell of the level was visited
    SamplingExhausted {
        /// Number of patches requested
        requested: usize,
        /// Number of patches accepted before giving up
        accepted: usize,
        /// Number of tiles read
        attempts: usize,
        /// Number of candidate grid cells at the sampled level
        grid_cells: usize,
    },

    /// The sampling observer asked to stop
    SamplingCancelled {
        /// Number of patches accepted before cancellation
        accepted: usize,
        /// Number of tiles read before cancellation
        attempts: usize,
    },

    /// An identifier has zero or several counterparts in the other dataset
    AmbiguousIdentifier {
        /// The unresolved identifier
        identifier: String,
        /// Whether nothing or too much matched
        kind: Ambiguity,
        /// Candidates above the threshold with their similarity scores
        candidates: Vec<(String, f64)>,
    },

    /// Matches computed in the two directions disagree
    MappingConflict {
        /// Number of (metadata, cell) pairs found from the metadata side
        metadata_side: usize,
        /// Number of (metadata, cell) pairs found from the cell side
        cell_side: usize,
        /// Pairs found in only one direction
        disputed: Vec<(String, String)>,
    },

    /// A feature group has no rows to aggregate
    EmptyGroup {
        /// Display form of the (patient, arm, treatment) key
        group: String,
    },

    /// An arm value outside {case, control}
    UnknownArm {
        /// Patient the row belongs to
        patient_id: String,
        /// The unexpected arm value
        arm: String,
    },

    /// An external collaborator broke its same-length contract
    CollaboratorContract {
        /// Pipeline stage that returned the sequence
        stage: &'static str,
        /// Number of items sent to the collaborator
        expected: usize,
        /// Number of items it returned
        actual: usize,
    },

    /// A statistical test got too few observations
    InsufficientSamples {
        /// Name of the test
        test: &'static str,
        /// Smallest sample size the test accepts
        required: usize,
        /// Size of the smaller sample
        actual: usize,
    },

    /// Numerical computation produced invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Csv { path, source } => {
                write!(f, "CSV error in '{}': {source}", path.display())
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::SamplingExhausted {
                requested,
                accepted,
                attempts,
                grid_cells,
            } => {
                write!(
                    f,
                    "Sampling exhausted: accepted {accepted} of {requested} patches after {attempts} attempts ({grid_cells} grid cells)"
                )
            }
            Self::SamplingCancelled { accepted, attempts } => {
                write!(
                    f,
                    "Sampling cancelled after {attempts} attempts ({accepted} patches accepted)"
                )
            }
            Self::AmbiguousIdentifier {
                identifier,
                kind,
                candidates,
            } => {
                let listed = candidates
                    .iter()
                    .map(|(name, score)| format!("{name} ({score:.3})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "Ambiguous identifier '{identifier}': {kind} [{listed}]"
                )
            }
            Self::MappingConflict {
                metadata_side,
                cell_side,
                disputed,
            } => {
                let listed = disputed
                    .iter()
                    .map(|(metadata, cell)| format!("{metadata} <-> {cell}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "Identifier mapping conflict: {metadata_side} metadata-side vs {cell_side} cell-side matches [{listed}]"
                )
            }
            Self::EmptyGroup { group } => {
                write!(f, "Feature group {group} has no cells")
            }
            Self::UnknownArm { patient_id, arm } => {
                write!(
                    f,
                    "Unknown arm '{arm}' for patient {patient_id} (expected case or control)"
                )
            }
            Self::CollaboratorContract {
                stage,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{stage} returned {actual} results for {expected} inputs"
                )
            }
            Self::InsufficientSamples {
                test,
                required,
                actual,
            } => {
                write!(
                    f,
                    "{test} needs at least {required} observations per sample, got {actual}"
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Attaches the offending path to errors converted without one
pub trait WithPath<T> {
    /// Replace the placeholder path of an I/O, image or CSV error
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithPath<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                PipelineError::ImageLoad { path: slot, .. }
                | PipelineError::ImageExport { path: slot, .. }
                | PipelineError::FileSystem { path: slot, .. }
                | PipelineError::Csv { path: slot, .. } => {
                    *slot = path.to_path_buf();
                }
                _ => {}
            }
            error
        })
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> PipelineError {
    PipelineError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create an invalid source data error
pub fn invalid_source(reason: &impl ToString) -> PipelineError {
    PipelineError::InvalidSourceData {
        reason: reason.to_string(),
    }
}
