//! Multi-slide sampling progress with automatic batching for large sets

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use crate::sampling::sampler::SamplingProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Display state of one slide
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideState {
    /// File name shown next to the bar
    pub name: String,
    /// Patches accepted so far
    pub accepted: usize,
    /// Patches requested
    pub requested: usize,
    /// Tiles read so far
    pub attempts: usize,
}

/// Coordinates progress display while sampling several slides
///
/// Shows one bar per slide for small batches and adds a batch bar once the
/// slide count exceeds what fits on screen. Only the most recent slides keep a
/// bar of their own.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    slide_bars: Vec<ProgressBar>,
    slide_states: Vec<SlideState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static SLIDE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Slides: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            slide_bars: Vec::new(),
            slide_states: Vec::new(),
        }
    }

    /// Initialize progress bars based on slide count
    pub fn initialize(&mut self, slide_count: usize) {
        // Switch to batch mode for large slide sets to avoid terminal spam
        if slide_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(slide_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..slide_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let pb = ProgressBar::new(0);
            pb.set_style(SLIDE_STYLE.clone());
            self.slide_bars.push(self.multi_progress.add(pb));
        }
    }

    /// Configure progress for a new slide
    pub fn start_slide(&mut self, index: usize, path: &Path, requested: usize) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.slide_states.len() {
            self.slide_states.resize(index + 1, SlideState::default());
        }
        if let Some(state) = self.slide_states.get_mut(index) {
            *state = SlideState {
                name,
                accepted: 0,
                requested,
                attempts: 0,
            };
        }
        self.update_bars();
    }

    /// Report the latest sampling snapshot of a slide
    pub fn update_sampling(&mut self, index: usize, progress: SamplingProgress) {
        if let Some(state) = self.slide_states.get_mut(index) {
            state.accepted = progress.accepted;
            state.attempts = progress.attempts;
        }
        self.update_bars();
    }

    /// Mark a slide as completed and advance the batch bar
    pub fn complete_slide(&mut self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(state) = self.slide_states.get_mut(index) {
            state.name = format!("✓ {}", state.name);
            state.accepted = state.requested;
        }
        self.update_bars();
    }

    /// Current display state of a slide
    pub fn slide_state(&self, index: usize) -> Option<&SlideState> {
        self.slide_states.get(index)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All slides processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Update all progress bars to show the last N started slides
    fn update_bars(&self) {
        let active: Vec<&SlideState> = self
            .slide_states
            .iter()
            .filter(|state| !state.name.is_empty())
            .collect();

        let start_idx = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start_idx..).unwrap_or(&[]);

        for (bar_idx, state) in visible.iter().enumerate() {
            if let Some(bar) = self.slide_bars.get(bar_idx) {
                bar.set_length(state.requested as u64);
                bar.set_position(state.accepted as u64);
                let width = state.requested.to_string().len();
                bar.set_message(format!(
                    "{:>width$}/{} ({} reads)",
                    state.accepted, state.requested, state.attempts
                ));
                bar.set_prefix(state.name.clone());
            }
        }

        for bar_idx in visible.len()..self.slide_bars.len() {
            if let Some(bar) = self.slide_bars.get(bar_idx) {
                bar.set_length(0);
                bar.set_position(0);
                bar.set_message(String::new());
                bar.set_prefix(String::new());
            }
        }
    }
}
