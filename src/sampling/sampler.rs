//! Bounded rejection sampling of tissue patches from a slide
//!
//! Candidate origins lie on a grid whose step is the patch side times
//! [`PATCH_SPACING_FACTOR`], so accepted patches never share pixels. Cells are
//! visited in a uniformly random order without repetition and a tile is kept
//! only if its mean intensity is below the tissue threshold. Every tile read
//! counts against the attempt budget.

use crate::io::configuration::{
    DEFAULT_LEVEL, DEFAULT_MAX_ATTEMPTS, DEFAULT_PATCH_COUNT, DEFAULT_PATCH_SIZE,
    PATCH_SPACING_FACTOR, TISSUE_INTENSITY_THRESHOLD,
};
use crate::io::error::{PipelineError, Result, invalid_parameter};
use crate::sampling::slide::{Patch, SlideImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Parameters of one sampling run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerConfig {
    /// Side length of each patch in pixels
    pub patch_size: u32,
    /// Pyramid level to read from
    pub level: usize,
    /// Number of patches to accept
    pub count: usize,
    /// Maximum number of tiles read before giving up
    pub max_attempts: usize,
    /// Mean intensity a tile must stay below to count as tissue
    pub tissue_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
            level: DEFAULT_LEVEL,
            count: DEFAULT_PATCH_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tissue_threshold: TISSUE_INTENSITY_THRESHOLD,
        }
    }
}

impl SamplerConfig {
    /// Distance between neighbouring candidate origins
    pub fn step_size(&self) -> u32 {
        (f64::from(self.patch_size) * PATCH_SPACING_FACTOR).floor() as u32
    }

    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.patch_size == 0 {
            return Err(invalid_parameter(
                "patch_size",
                &self.patch_size,
                &"must be positive",
            ));
        }
        if self.count == 0 {
            return Err(invalid_parameter("count", &self.count, &"must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &self.max_attempts,
                &"must be positive",
            ));
        }
        if !(0.0..=256.0).contains(&self.tissue_threshold) {
            return Err(invalid_parameter(
                "tissue_threshold",
                &self.tissue_threshold,
                &"must lie on the 8-bit intensity scale",
            ));
        }
        Ok(())
    }
}

/// Candidate origins of one level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingGrid {
    /// Distance between neighbouring origins
    pub step: u32,
    /// Number of origins along x
    pub columns: u32,
    /// Number of origins along y
    pub rows: u32,
}

impl SamplingGrid {
    /// Grid of origins fitting in a `(width, height)` level
    pub const fn new(dimensions: (u32, u32), step: u32) -> Self {
        if step == 0 {
            return Self {
                step,
                columns: 0,
                rows: 0,
            };
        }
        Self {
            step,
            columns: dimensions.0 / step,
            rows: dimensions.1 / step,
        }
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Top-left pixel of a cell, cells numbered row-major
    pub const fn origin(&self, cell: usize) -> Option<(u32, u32)> {
        if self.columns == 0 || cell >= self.cell_count() {
            return None;
        }
        let columns = self.columns as usize;
        let x = (cell % columns) as u32 * self.step;
        let y = (cell / columns) as u32 * self.step;
        Some((x, y))
    }
}

/// Snapshot handed to a sampling observer after every attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingProgress {
    /// Patches accepted so far
    pub accepted: usize,
    /// Tiles read so far
    pub attempts: usize,
    /// Patches requested
    pub requested: usize,
}

/// Draws distinct tissue patches with a seeded random source
pub struct PatchSampler<R = StdRng> {
    config: SamplerConfig,
    rng: R,
}

impl PatchSampler<StdRng> {
    /// Create a sampler with a reproducible random source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn seeded(config: SamplerConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PatchSampler<R> {
    /// Create a sampler drawing from the given random source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_rng(config: SamplerConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Configuration of this sampler
    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw `count` tissue patches from the slide
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configured level doesn't exist
    /// - A tile can't be read
    /// - The attempt budget or the grid runs out first
    pub fn sample<S: SlideImage + ?Sized>(&mut self, slide: &S) -> Result<Vec<Patch>> {
        self.sample_observed(slide, |_| ControlFlow::Continue(()))
    }

    /// Draw patches, reporting progress after every attempt
    ///
    /// The observer may return [`ControlFlow::Break`] to stop early.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sample`], plus [`PipelineError::SamplingCancelled`] when the
    /// observer stops the run
    pub fn sample_observed<S, F>(&mut self, slide: &S, mut observer: F) -> Result<Vec<Patch>>
    where
        S: SlideImage + ?Sized,
        F: FnMut(SamplingProgress) -> ControlFlow<()>,
    {
        let config = self.config;
        let dimensions = slide.level_dimensions(config.level).ok_or_else(|| {
            invalid_parameter(
                "level",
                &config.level,
                &format!("slide has {} levels", slide.level_count()),
            )
        })?;

        let grid = SamplingGrid::new(dimensions, config.step_size());
        let grid_cells = grid.cell_count();
        if grid_cells == 0 {
            return Err(PipelineError::SamplingExhausted {
                requested: config.count,
                accepted: 0,
                attempts: 0,
                grid_cells,
            });
        }
        let budget = config.max_attempts.min(grid_cells);

        // Distinct cells in uniformly random order
        let order = rand::seq::index::sample(&mut self.rng, grid_cells, budget);

        let mut patches = Vec::with_capacity(config.count);
        let mut attempts = 0;

        for cell in order.iter() {
            let Some(origin) = grid.origin(cell) else {
                continue;
            };
            let patch = slide.read_region(origin, config.level, config.patch_size)?;
            attempts += 1;

            let intensity = patch.mean_intensity();
            if intensity < config.tissue_threshold {
                patches.push(patch);
            } else {
                debug!(
                    x = origin.0,
                    y = origin.1,
                    intensity,
                    "rejected background tile"
                );
            }

            let progress = SamplingProgress {
                accepted: patches.len(),
                attempts,
                requested: config.count,
            };
            let done = patches.len() == config.count;
            if observer(progress).is_break() && !done {
                return Err(PipelineError::SamplingCancelled {
                    accepted: patches.len(),
                    attempts,
                });
            }
            if done {
                break;
            }
        }

        if patches.len() < config.count {
            return Err(PipelineError::SamplingExhausted {
                requested: config.count,
                accepted: patches.len(),
                attempts,
                grid_cells,
            });
        }

        info!(
            accepted = patches.len(),
            attempts,
            grid_cells,
            level = config.level,
            "sampled tissue patches"
        );
        Ok(patches)
    }
}

/// Draw `count` tissue patches of side `patch_size` from `level`
///
/// Uses the default attempt budget and tissue threshold.
///
/// # Errors
///
/// See [`PatchSampler::sample`]
pub fn sample<S: SlideImage + ?Sized>(
    slide: &S,
    patch_size: u32,
    level: usize,
    count: usize,
    seed: u64,
) -> Result<Vec<Patch>> {
    let config = SamplerConfig {
        patch_size,
        level,
        count,
        ..SamplerConfig::default()
    };
    PatchSampler::seeded(config, seed)?.sample(slide)
}
