//! Patch acquisition from multi-resolution slides
//!
//! This module contains:
//! - The slide abstraction and an in-memory pyramid
//! - Bounded rejection sampling of tissue patches

/// Bounded random sampling of tissue-bearing patches
pub mod sampler;
/// Slide access trait, patches and the in-memory pyramid
pub mod slide;

pub use sampler::{PatchSampler, SamplerConfig};
pub use slide::{Patch, SlideImage, SlidePyramid};
