//! One-to-one reconciliation of sample identifiers between two datasets
//!
//! Cell tables and the metadata table name the same samples independently, so
//! the same slide may appear as `P1-pre` in one and `P1_pre` in the other.
//! Every identifier present on only one side is matched against the full
//! identifier set of the other side by [`similarity`]. Matches are computed in
//! both directions and must agree. The resulting [`CanonicalMapping`] rewrites
//! metadata identifiers into cell identifiers so that a later join can use exact
//! key equality.

use crate::io::configuration::{SCORE_TIE_TOLERANCE, SIMILARITY_THRESHOLD};
use crate::io::error::{Ambiguity, PipelineError, Result, invalid_parameter};
use crate::matching::similarity::similarity;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// How a missing identifier picks its counterpart among the candidates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Exactly one identifier may pass the threshold
    UniqueAboveThreshold,
    /// The single best-scoring identifier above the threshold, ties are ambiguous
    #[default]
    BestAboveThreshold,
}

/// Resolved correspondence from metadata identifiers to cell identifiers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalMapping {
    to_cell: BTreeMap<String, String>,
}

impl CanonicalMapping {
    /// Cell identifier for a metadata identifier, unchanged when not remapped
    pub fn resolve<'a>(&'a self, metadata_name: &'a str) -> &'a str {
        self.to_cell
            .get(metadata_name)
            .map_or(metadata_name, String::as_str)
    }

    /// Number of remapped identifiers
    pub fn len(&self) -> usize {
        self.to_cell.len()
    }

    /// Whether no identifier needed remapping
    pub fn is_empty(&self) -> bool {
        self.to_cell.is_empty()
    }

    /// Remapped `(metadata, cell)` pairs in metadata order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.to_cell
            .iter()
            .map(|(metadata, cell)| (metadata.as_str(), cell.as_str()))
    }
}

/// Fuzzy identifier matcher with a fixed threshold and policy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reconciler {
    threshold: f64,
    policy: MatchPolicy,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
            policy: MatchPolicy::default(),
        }
    }
}

impl Reconciler {
    /// Create a reconciler
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold lies outside `[0, 1)`
    pub fn new(threshold: f64, policy: MatchPolicy) -> Result<Self> {
        if !(0.0..1.0).contains(&threshold) {
            return Err(invalid_parameter(
                "threshold",
                &threshold,
                &"must lie in [0, 1)",
            ));
        }
        Ok(Self { threshold, policy })
    }

    /// Similarity an identifier must exceed to be a candidate
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Policy used to choose among candidates
    pub const fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Build the mapping between cell-table and metadata identifiers
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A missing identifier has no counterpart or an ambiguous one
    /// - The matches found from the two sides disagree
    pub fn reconcile(
        &self,
        cell_names: &BTreeSet<String>,
        metadata_names: &BTreeSet<String>,
    ) -> Result<CanonicalMapping> {
        // (metadata, cell) pairs seen from each side
        let mut metadata_side = Vec::new();
        for name in metadata_names.difference(cell_names) {
            let counterpart = self.counterpart(name, cell_names)?;
            metadata_side.push((name.clone(), counterpart));
        }

        let mut cell_side = Vec::new();
        for name in cell_names.difference(metadata_names) {
            let counterpart = self.counterpart(name, metadata_names)?;
            cell_side.push((counterpart, name.clone()));
        }

        let union: BTreeSet<(String, String)> = metadata_side
            .iter()
            .chain(cell_side.iter())
            .cloned()
            .collect();

        if metadata_side.len() != cell_side.len() || union.len() != metadata_side.len() {
            let from_metadata: BTreeSet<_> = metadata_side.iter().cloned().collect();
            let from_cells: BTreeSet<_> = cell_side.iter().cloned().collect();
            let disputed = from_metadata
                .symmetric_difference(&from_cells)
                .cloned()
                .collect();
            return Err(PipelineError::MappingConflict {
                metadata_side: metadata_side.len(),
                cell_side: cell_side.len(),
                disputed,
            });
        }

        let to_cell: BTreeMap<String, String> = union.into_iter().collect();
        info!(remapped = to_cell.len(), "reconciled sample identifiers");
        Ok(CanonicalMapping { to_cell })
    }

    /// The single identifier in `reference` that `name` resolves to
    fn counterpart(&self, name: &str, reference: &BTreeSet<String>) -> Result<String> {
        let mut candidates: Vec<(String, f64)> = reference
            .iter()
            .map(|candidate| (candidate.clone(), similarity(name, candidate)))
            .filter(|(_, score)| *score > self.threshold)
            .collect();

        // Best first, name order among equal scores
        candidates.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(&y.0)));

        let ambiguous = |candidates: Vec<(String, f64)>| PipelineError::AmbiguousIdentifier {
            identifier: name.to_string(),
            kind: Ambiguity::MultipleCandidates,
            candidates,
        };

        let Some((best, best_score)) = candidates.first().cloned() else {
            return Err(PipelineError::AmbiguousIdentifier {
                identifier: name.to_string(),
                kind: Ambiguity::NoCandidates,
                candidates,
            });
        };
        if candidates.len() == 1 {
            return Ok(best);
        }

        match self.policy {
            MatchPolicy::UniqueAboveThreshold => Err(ambiguous(candidates)),
            MatchPolicy::BestAboveThreshold => {
                let tied: Vec<(String, f64)> = candidates
                    .into_iter()
                    .filter(|(_, score)| best_score - score <= SCORE_TIE_TOLERANCE)
                    .collect();
                if tied.len() == 1 {
                    Ok(best)
                } else {
                    Err(ambiguous(tied))
                }
            }
        }
    }
}

/// Reconcile with the default threshold and policy
///
/// # Errors
///
/// See [`Reconciler::reconcile`]
pub fn reconcile(
    cell_names: &BTreeSet<String>,
    metadata_names: &BTreeSet<String>,
) -> Result<CanonicalMapping> {
    Reconciler::default().reconcile(cell_names, metadata_names)
}
