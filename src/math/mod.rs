//! Statistical utilities for the cohort comparison

/// Tail probabilities of the normal and Student t distributions
pub mod probability;
/// Two-sample tests with effect sizes
pub mod statistics;
