//! Identifier reconciliation between independently keyed datasets

/// Bidirectional one-to-one identifier matching
pub mod reconcile;
/// Edit-based similarity ratio between identifiers
pub mod similarity;

pub use reconcile::{CanonicalMapping, MatchPolicy, Reconciler};
pub use similarity::similarity;
