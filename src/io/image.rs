//! Slide loading and patch export through the `image` crate

use crate::io::error::{PipelineError, Result};
use crate::sampling::slide::{Patch, SlidePyramid};
use std::path::{Path, PathBuf};

/// Decode an image file and build an in-memory pyramid from it
///
/// # Errors
///
/// Returns an error if:
/// - The file can't be opened or decoded
/// - The pyramid parameters are invalid
pub fn open_slide(path: &Path, level_count: usize, downsample: u32) -> Result<SlidePyramid> {
    let image = image::open(path).map_err(|e| PipelineError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    SlidePyramid::build(image.to_rgba8(), level_count, downsample)
}

/// File name of an exported patch: `<stem>_L<level>_<x>_<y>.png`
pub fn patch_file_name(stem: &str, patch: &Patch) -> String {
    let (x, y) = patch.origin();
    format!("{stem}_L{}_{x}_{y}.png", patch.level())
}

/// Save patches as PNG files in `dir`, returning the written paths
///
/// # Errors
///
/// Returns an error if the directory can't be created or a patch can't be saved
pub fn export_patches(dir: &Path, stem: &str, patches: &[Patch]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::FileSystem {
        path: dir.to_path_buf(),
        operation: "create directory",
        source: e,
    })?;

    let mut written = Vec::with_capacity(patches.len());
    for patch in patches {
        let path = dir.join(patch_file_name(stem, patch));
        patch
            .to_rgba_image()
            .save(&path)
            .map_err(|e| PipelineError::ImageExport {
                path: path.clone(),
                source: e,
            })?;
        written.push(path);
    }
    Ok(written)
}
