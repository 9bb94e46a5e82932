//! Pipeline constants and runtime configuration defaults

// Tissue heuristic used by the patch sampler
/// Mean 8-bit intensity at or above which a tile counts as background
pub const TISSUE_INTENSITY_THRESHOLD: f64 = 220.0;
/// Grid step as a multiple of the patch side, keeps neighbours from touching
pub const PATCH_SPACING_FACTOR: f64 = 1.1;

// Default values for configurable sampling parameters
/// Side length of sampled patches in pixels
pub const DEFAULT_PATCH_SIZE: u32 = 512;
/// Pyramid level patches are read from
pub const DEFAULT_LEVEL: usize = 0;
/// Number of patches drawn per slide
pub const DEFAULT_PATCH_COUNT: usize = 50;
/// Tile reads allowed before sampling gives up
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;
/// Fixed seed for reproducible sampling
pub const DEFAULT_SEED: u64 = 42;

// Slide pyramid construction
/// Number of levels built for in-memory slides
pub const DEFAULT_PYRAMID_LEVELS: usize = 3;
/// Linear downsampling between consecutive levels
pub const PYRAMID_DOWNSAMPLE: u32 = 2;

// Identifier reconciliation
/// Similarity a counterpart identifier must exceed
pub const SIMILARITY_THRESHOLD: f64 = 0.5;
/// Scores closer than this are treated as a tie
pub const SCORE_TIE_TOLERANCE: f64 = 1e-12;

// Vocabulary shared with the external classification and metadata tables
/// Cell label counted as malignant
pub const MALIGNANT_LABEL: &str = "malignant";
/// Cell label counted as normal
pub const NORMAL_LABEL: &str = "normal";
/// Treatment phase before intervention
pub const PRE_PHASE: &str = "pre";
/// Treatment phase after intervention
pub const POST_PHASE: &str = "post";
/// Treated arm
pub const CASE_ARM: &str = "case";
/// Untreated arm
pub const CONTROL_ARM: &str = "control";

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Extension of tabular inputs and outputs
pub const TABLE_EXTENSION: &str = "csv";
/// Per-group feature table written by `analyze`
pub const FEATURES_FILE: &str = "features.csv";
/// Paired pre/post table written by `analyze`
pub const PRE_POST_FILE: &str = "pre_post.csv";
/// Named metrics table written by `analyze`
pub const METRICS_FILE: &str = "metrics.csv";
/// Extensions accepted as slide images by `sample`
pub const SLIDE_EXTENSIONS: [&str; 5] = ["png", "tif", "tiff", "jpg", "jpeg"];
