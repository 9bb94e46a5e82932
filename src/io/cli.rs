//! Command-line interface for patch sampling and cohort analysis

use crate::io::configuration::{
    DEFAULT_LEVEL, DEFAULT_MAX_ATTEMPTS, DEFAULT_PATCH_COUNT, DEFAULT_PATCH_SIZE,
    DEFAULT_PYRAMID_LEVELS, DEFAULT_SEED, FEATURES_FILE, METRICS_FILE, PRE_POST_FILE,
    PYRAMID_DOWNSAMPLE, SIMILARITY_THRESHOLD, SLIDE_EXTENSIONS, TISSUE_INTENSITY_THRESHOLD,
};
use crate::io::error::{PipelineError, Result, invalid_parameter};
use crate::io::export::{write_features, write_metrics, write_pre_post};
use crate::io::image::{export_patches, open_slide};
use crate::io::loader::{list_files, load_cell_tables, load_metadata};
use crate::io::progress::ProgressManager;
use crate::matching::reconcile::{MatchPolicy, Reconciler};
use crate::pipeline::runner::{CohortAnalysis, CohortReport};
use crate::sampling::sampler::{PatchSampler, SamplerConfig};
use clap::{Args, Parser, Subcommand};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "histoquant")]
#[command(
    author,
    version,
    about = "Sample tissue patches and compare malignant-cell ratios across cohorts"
)]
/// Command-line arguments of the pipeline tool
pub struct Cli {
    /// Stage to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Pipeline stages exposed on the command line
#[derive(Subcommand)]
pub enum Command {
    /// Draw tissue patches from slide images and save them as PNG
    Sample(SampleArgs),
    /// Reconcile, aggregate and compare cell tables against the metadata
    Analyze(AnalyzeArgs),
}

/// Arguments of the `sample` stage
#[derive(Args)]
pub struct SampleArgs {
    /// Slide image or directory of slide images
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Directory receiving the patches
    #[arg(short, long, default_value = "patches")]
    pub output: PathBuf,

    /// Side length of each patch in pixels
    #[arg(short = 'p', long, default_value_t = DEFAULT_PATCH_SIZE)]
    pub patch_size: u32,

    /// Pyramid level to sample from
    #[arg(short, long, default_value_t = DEFAULT_LEVEL)]
    pub level: usize,

    /// Number of patches per slide
    #[arg(short = 'n', long, default_value_t = DEFAULT_PATCH_COUNT)]
    pub count: usize,

    /// Tile reads allowed per slide before giving up
    #[arg(short = 'a', long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    /// Mean intensity below which a tile counts as tissue
    #[arg(short = 't', long, default_value_t = TISSUE_INTENSITY_THRESHOLD)]
    pub tissue_threshold: f64,

    /// Number of pyramid levels built per slide
    #[arg(long, default_value_t = DEFAULT_PYRAMID_LEVELS)]
    pub pyramid_levels: usize,

    /// Random seed for reproducible sampling
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl SampleArgs {
    /// Sampler configuration described by these arguments
    pub const fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            patch_size: self.patch_size,
            level: self.level,
            count: self.count,
            max_attempts: self.max_attempts,
            tissue_threshold: self.tissue_threshold,
        }
    }
}

/// Arguments of the `analyze` stage
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Metadata table with name, patient_id, arm and treatment columns
    #[arg(value_name = "METADATA")]
    pub metadata: PathBuf,

    /// Directory of per-sample cell tables
    #[arg(value_name = "CELLS")]
    pub cells: PathBuf,

    /// Directory receiving the derived tables
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Similarity an identifier must exceed to be matched
    #[arg(long, default_value_t = SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    /// Require exactly one candidate above the threshold
    #[arg(long)]
    pub strict: bool,
}

impl AnalyzeArgs {
    /// Identifier matcher described by these arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is out of range
    pub fn reconciler(&self) -> Result<Reconciler> {
        let policy = if self.strict {
            MatchPolicy::UniqueAboveThreshold
        } else {
            MatchPolicy::BestAboveThreshold
        };
        Reconciler::new(self.threshold, policy)
    }
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Run the selected stage
    ///
    /// # Errors
    ///
    /// Returns an error if the stage fails
    pub fn run(self) -> Result<()> {
        let show_progress = self.should_show_progress();
        match self.command {
            Command::Sample(args) => SlideProcessor::new(args, show_progress).process(),
            Command::Analyze(args) => {
                AnalysisProcessor::new(args).process()?;
                Ok(())
            }
        }
    }
}

/// Samples patches from every slide of the target with progress tracking
pub struct SlideProcessor {
    args: SampleArgs,
    progress_manager: Option<ProgressManager>,
}

impl SlideProcessor {
    /// Create a processor for the given arguments
    pub fn new(args: SampleArgs, show_progress: bool) -> Self {
        let progress_manager = show_progress.then(ProgressManager::new);
        Self {
            args,
            progress_manager,
        }
    }

    /// Sample every slide and write its patches
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid or any slide fails
    pub fn process(&mut self) -> Result<()> {
        let slides = self.collect_slides()?;
        if slides.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(slides.len());
        }

        for (index, slide) in slides.iter().enumerate() {
            self.process_slide(slide, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }
        Ok(())
    }

    /// Slide files named by the target, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a slide image nor a directory
    pub fn collect_slides(&self) -> Result<Vec<PathBuf>> {
        let target = &self.args.target;
        if target.is_dir() {
            return list_files(target, &SLIDE_EXTENSIONS);
        }

        let is_slide = target
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| {
                SLIDE_EXTENSIONS
                    .iter()
                    .any(|e| ext.eq_ignore_ascii_case(e))
            });
        if target.is_file() && is_slide {
            Ok(vec![target.clone()])
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be a slide image or a directory of slide images",
            ))
        }
    }

    fn process_slide(&mut self, path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();
        let config = self.args.sampler_config();

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_slide(index, path, config.count);
        }

        let slide = open_slide(path, self.args.pyramid_levels, PYRAMID_DOWNSAMPLE)?;
        let seed = self.args.seed.wrapping_add(index as u64);
        let mut sampler = PatchSampler::seeded(config, seed)?;

        let patches = match self.progress_manager {
            Some(ref mut pm) => sampler.sample_observed(&slide, |progress| {
                pm.update_sampling(index, progress);
                ControlFlow::Continue(())
            })?,
            None => sampler.sample(&slide)?,
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::InvalidSourceData {
                reason: format!("slide '{}' has no file name", path.display()),
            })?;
        let written = export_patches(&self.args.output, &stem, &patches)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_slide(index);
        }
        info!(
            slide = %path.display(),
            patches = written.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "exported patches"
        );
        Ok(())
    }
}

/// Runs the cohort stages over tables on disk and writes the results
pub struct AnalysisProcessor {
    args: AnalyzeArgs,
}

impl AnalysisProcessor {
    /// Create a processor for the given arguments
    pub const fn new(args: AnalyzeArgs) -> Self {
        Self { args }
    }

    /// Load the inputs, run the analysis and write the derived tables
    ///
    /// # Errors
    ///
    /// Returns an error if loading, any cohort stage or writing fails
    pub fn process(&self) -> Result<CohortReport> {
        let analysis = CohortAnalysis::new(self.args.reconciler()?);
        let metadata = load_metadata(&self.args.metadata)?;
        let cells = load_cell_tables(&self.args.cells)?;

        let report = analysis.run(&cells, &metadata)?;

        let output = &self.args.output;
        std::fs::create_dir_all(output).map_err(|e| PipelineError::FileSystem {
            path: output.clone(),
            operation: "create directory",
            source: e,
        })?;
        write_features(&output.join(FEATURES_FILE), &report.features)?;
        write_pre_post(&output.join(PRE_POST_FILE), &report.pairs)?;

        let metrics = report.metrics();
        write_metrics(&output.join(METRICS_FILE), &metrics)?;
        for (metric, value) in &metrics {
            info!(metric = metric.as_str(), value, "cohort metric");
        }
        Ok(report)
    }
}
