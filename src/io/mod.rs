//! Input/output operations and error handling

/// Command-line parsing and stage processors
pub mod cli;
/// Default parameters and file conventions
pub mod configuration;
/// Error types for all pipeline operations
pub mod error;
/// CSV export of the derived tables
pub mod export;
/// Slide decoding and patch export
pub mod image;
/// CSV loading of metadata and cell tables
pub mod loader;
/// Progress display for multi-slide sampling
pub mod progress;
